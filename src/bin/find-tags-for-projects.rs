//! find-tags-for-projects - list release versions per project.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use release_scan::cli::{self, CommonArgs};
use release_scan::scan::find_tags_for_projects;

/// Print the release versions of each project as JSON.
#[derive(Parser, Debug)]
#[command(name = "find-tags-for-projects")]
#[command(about = "Print the release/<version> tags of each project as JSON")]
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
    let runner = cli::git_runner(&settings);

    let output = find_tags_for_projects(&runner, &settings.root, &settings.projects).await?;
    cli::emit_json(&output)
}
