//! Version-control access behind a narrow capability trait.
//!
//! Only two queries are needed: the tag names of a working copy, and the
//! commits between two references. Everything that parses text produced
//! from these queries lives in [`crate::tags`] and [`crate::tickets`].

pub mod git;

use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::error::VcsError;

pub use git::Git2Backend;

/// Field delimiter used when a commit is rendered as a single line.
pub const FIELD_DELIMITER: &str = "----__----";

/// One commit from a log range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLine {
    pub subject: String,
    pub short_hash: String,
    pub date: DateTime<FixedOffset>,
    pub author: String,
}

impl CommitLine {
    /// Render as `subject----__----hash----__----date----__----author`.
    pub fn render(&self) -> String {
        [
            self.subject.as_str(),
            self.short_hash.as_str(),
            &self.date.to_rfc3339(),
            self.author.as_str(),
        ]
        .join(FIELD_DELIMITER)
    }
}

/// Read access to the repository of a single project.
///
/// This abstraction allows mocking repositories in tests.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl: Send + Sync {
    /// All tag names of the working copy at `workdir`, in no particular order.
    fn list_tags(&self, workdir: &Path) -> Result<Vec<String>, VcsError>;

    /// Commits reachable from `to_ref` but not from `from_ref`, newest first
    /// by commit date. Commits whose message contains `exclude` are dropped.
    fn log_between(
        &self,
        workdir: &Path,
        from_ref: &str,
        to_ref: &str,
        exclude: &str,
    ) -> Result<Vec<CommitLine>, VcsError>;
}
