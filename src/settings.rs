//! Resolved run settings.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{ConfigError, InputError};

/// Default timeout for a single repository query (60 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "RELEASE_SCAN_TIMEOUT";

/// What to do when a project's repository cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log a warning and report an empty result for the project.
    #[default]
    Skip,
    /// Abort the whole run with the error.
    Fail,
}

/// Everything a scan needs, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub projects: Vec<String>,
    pub jobs: usize,
    pub timeout: Duration,
    pub policy: FailurePolicy,
}

impl Settings {
    /// Build settings, validating the worker count and timeout.
    pub fn new(
        root: PathBuf,
        projects: Vec<String>,
        jobs: usize,
        timeout: Duration,
        policy: FailurePolicy,
    ) -> Result<Self, ConfigError> {
        if jobs == 0 {
            return Err(ConfigError::InvalidJobs(jobs));
        }
        if timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidTimeout(timeout.as_secs()));
        }

        Ok(Self {
            root,
            projects,
            jobs,
            timeout,
            policy,
        })
    }
}

/// Get the configured timeout duration.
///
/// An explicit value wins. Otherwise reads `RELEASE_SCAN_TIMEOUT`, falling
/// back to 60 seconds with a warning when the variable holds anything other
/// than a positive integer.
pub fn resolve_timeout(explicit: Option<u64>) -> Duration {
    if let Some(secs) = explicit {
        return Duration::from_secs(secs);
    }

    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Resolve the project root against `base` unless it is already absolute.
pub fn resolve_root(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

/// Parse the `-p` value: a JSON array of project names.
pub fn parse_projects(json: &str) -> Result<Vec<String>, InputError> {
    serde_json::from_str(json).map_err(InputError::InvalidProjects)
}
