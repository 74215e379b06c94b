//! Shared pieces of the command-line tools.

use std::future::Future;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use crate::batch::Runner;
use crate::error::{ConfigError, InputError};
use crate::settings::{FailurePolicy, Settings, parse_projects, resolve_root, resolve_timeout};
use crate::vcs::Git2Backend;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "RELEASE_SCAN_LOG";

/// Exit code for malformed `-p` or stdin JSON.
pub const EXIT_INVALID_INPUT: u8 = 3;

/// Exit code for invalid flag values, matching clap's usage errors.
pub const EXIT_USAGE: u8 = 2;

/// Flags shared by every tool.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding one working copy per project (relative paths are
    /// resolved against the current directory)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: PathBuf,

    /// JSON array of project names, e.g. '["svc-a","svc-b"]'
    #[arg(short = 'p', long = "projects", value_name = "JSON")]
    pub projects: String,

    /// Number of projects to read in parallel
    #[arg(short = 'j', long, default_value_t = 1)]
    pub jobs: usize,

    /// Seconds before a single repository query is abandoned
    /// (default: $RELEASE_SCAN_TIMEOUT or 60)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail on the first unreadable repository or unknown tag instead of
    /// skipping the project
    #[arg(long)]
    pub strict: bool,
}

impl CommonArgs {
    /// Resolve flags into [`Settings`], with `base` as the directory that
    /// relative paths are relative to.
    pub fn settings(&self, base: &Path) -> Result<Settings> {
        let projects = parse_projects(&self.projects)?;
        let policy = if self.strict {
            FailurePolicy::Fail
        } else {
            FailurePolicy::Skip
        };

        let settings = Settings::new(
            resolve_root(base, &self.dir),
            projects,
            self.jobs,
            resolve_timeout(self.timeout),
            policy,
        )?;
        Ok(settings)
    }
}

/// Runner over the libgit2 backend.
pub fn git_runner(settings: &Settings) -> Runner {
    Runner::from_settings(Arc::new(Git2Backend::new()), settings)
}

/// Install the stderr log subscriber.
///
/// Filter comes from `RELEASE_SCAN_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Drive `future` to completion on a fresh multi-threaded runtime.
///
/// The runtime is shut down without waiting for blocking jobs, so a
/// repository call abandoned after its timeout cannot hold the process open.
pub fn block_on<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(future);
    runtime.shutdown_background();
    result
}

/// Read and parse all of standard input.
pub fn read_stdin_json<T: DeserializeOwned>() -> Result<T, InputError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(InputError::ReadStdin)?;
    parse_input(&input)
}

/// Parse JSON input supplied on standard input.
pub fn parse_input<T: DeserializeOwned>(input: &str) -> Result<T, InputError> {
    serde_json::from_str(input.trim()).map_err(InputError::InvalidManifests)
}

/// Write `value` to stdout as one line of JSON.
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).context("Failed to serialize output")?;
    writeln!(stdout).context("Failed to write output")?;
    Ok(())
}

/// Map a failed run to its process exit status.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<InputError>().is_some() {
        EXIT_INVALID_INPUT
    } else if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_USAGE
    } else {
        1
    }
}

/// Report `result` on stderr and turn it into an exit code.
pub fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}
