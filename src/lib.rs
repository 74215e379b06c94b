//! release-scan - extract release metadata from a directory of project repositories.
//!
//! # Overview
//!
//! Each project is a git working copy under a common root. The tools read
//! `release/<version>` tags, collect issue-tracker ticket references from
//! the commits between two releases, and relate both to release manifests.
//! Results are printed as JSON for the release tooling that calls them.

pub mod batch;
pub mod cli;
pub mod error;
pub mod manifest;
pub mod report;
pub mod scan;
pub mod settings;
pub mod tags;
pub mod tickets;
pub mod vcs;

// Re-export commonly used types
pub use error::{ConfigError, InputError, VcsError};
pub use manifest::{Manifest, ManifestPair, ProjectVersion};
pub use report::{ManifestTags, ManifestTickets, ProjectTags};
pub use settings::{FailurePolicy, Settings};
pub use vcs::{CommitLine, Git2Backend, VersionControl};
