//! find-tags-for-manifests - list the release versions each manifest shipped.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use release_scan::cli::{self, CommonArgs};
use release_scan::manifest::Manifest;
use release_scan::scan::find_tags_for_manifests;

/// Read manifests (oldest first) from stdin and print the versions each shipped.
#[derive(Parser, Debug)]
#[command(name = "find-tags-for-manifests")]
#[command(
    about = "Read a JSON array of manifests (oldest first) from stdin and print the release versions each one shipped"
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
    let manifests: Vec<Manifest> = cli::read_stdin_json()?;
    let runner = cli::git_runner(&settings);

    let output =
        find_tags_for_manifests(&runner, &settings.root, &settings.projects, &manifests).await?;
    cli::emit_json(&output)
}
