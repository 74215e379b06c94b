//! find-tickets-for-manifests - collect ticket references shipped by each manifest.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use release_scan::cli::{self, CommonArgs};
use release_scan::manifest::ManifestPair;
use release_scan::scan::find_tickets_for_manifests;

/// Read manifest pairs from stdin and print the tickets each one ships.
#[derive(Parser, Debug)]
#[command(name = "find-tickets-for-manifests")]
#[command(
    about = "Read [{CurrentManifest, PreviousManifest}] JSON from stdin and print the tickets referenced between them"
)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_tracing();
    cli::finish(cli::block_on(run(cli)))
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let settings = cli.common.settings(&cwd)?;
    let pairs: Vec<ManifestPair> = cli::read_stdin_json()?;
    let runner = cli::git_runner(&settings);

    let output =
        find_tickets_for_manifests(&runner, &settings.root, &settings.projects, &pairs).await?;
    cli::emit_json(&output)
}
