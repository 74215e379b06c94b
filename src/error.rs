//! Error types for release-scan modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from repository access.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Project directory not found: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("Not a git repository: {}: {source}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Unknown tag '{tag}'")]
    UnknownTag { tag: String },

    #[error("Failed to list tags: {0}")]
    ListTags(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    Revwalk(#[source] git2::Error),

    #[error("Repository query for project '{project}' timed out after {secs} seconds")]
    Timeout { project: String, secs: u64 },

    #[error("Repository worker failed: {0}")]
    WorkerFailed(String),
}

impl VcsError {
    /// Whether the error means the requested tag range does not exist.
    pub fn is_unknown_tag(&self) -> bool {
        matches!(self, VcsError::UnknownTag { .. })
    }
}

/// Errors from malformed caller input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid project list, expected a JSON array of strings: {0}")]
    InvalidProjects(#[source] serde_json::Error),

    #[error("Invalid manifests on standard input: {0}")]
    InvalidManifests(#[source] serde_json::Error),

    #[error("Failed to read standard input: {0}")]
    ReadStdin(#[source] std::io::Error),
}

/// Errors from settings resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Timeout must be at least 1 second, got {0}")]
    InvalidTimeout(u64),

    #[error("Worker count must be at least 1, got {0}")]
    InvalidJobs(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_not_found_mentions_path() {
        let err = VcsError::ProjectNotFound {
            path: PathBuf::from("/srv/projects/svc-a"),
        };
        assert_eq!(
            err.to_string(),
            "Project directory not found: /srv/projects/svc-a"
        );
    }

    #[test]
    fn test_unknown_tag_classification() {
        let err = VcsError::UnknownTag {
            tag: "release/9.9.9".to_string(),
        };
        assert!(err.is_unknown_tag());
        assert!(err.to_string().contains("release/9.9.9"));

        let other = VcsError::WorkerFailed("panicked".to_string());
        assert!(!other.is_unknown_tag());
    }

    #[test]
    fn test_timeout_message() {
        let err = VcsError::Timeout {
            project: "svc-b".to_string(),
            secs: 5,
        };
        assert_eq!(
            err.to_string(),
            "Repository query for project 'svc-b' timed out after 5 seconds"
        );
    }

    #[test]
    fn test_invalid_projects_wraps_serde_error() {
        let source = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let err = InputError::InvalidProjects(source);
        assert!(err.to_string().starts_with("Invalid project list"));
    }
}
