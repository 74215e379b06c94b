//! Ticket reference extraction from commit ranges.

use std::path::Path;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use crate::error::VcsError;
use crate::tags::release_tag;
use crate::vcs::VersionControl;

/// Commits whose message contains this marker are never inspected.
pub const MERGE_MARKER: &str = "Merge";

static TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[-_]\d+").expect("ticket pattern is valid"));

/// First ticket identifier in `line`, if any.
pub fn extract_ticket(line: &str) -> Option<&str> {
    TICKET.find(line).map(|m| m.as_str())
}

/// Ticket identifiers referenced between two releases of `project`.
///
/// The range excludes `release/<start>` and includes `release/<end>`. Each
/// commit contributes at most one identifier; duplicates are kept.
pub fn list_tickets(
    vcs: &dyn VersionControl,
    root: &Path,
    project: &str,
    start: &str,
    end: &str,
) -> Result<Vec<String>, VcsError> {
    if start == end {
        return Ok(Vec::new());
    }

    let commits = vcs.log_between(
        &root.join(project),
        &release_tag(start),
        &release_tag(end),
        MERGE_MARKER,
    )?;

    let tickets: Vec<String> = commits
        .iter()
        .filter_map(|commit| extract_ticket(&commit.render()).map(str::to_string))
        .collect();

    debug!(
        project,
        start,
        end,
        commits = commits.len(),
        tickets = tickets.len(),
        "Extracted tickets"
    );

    Ok(tickets)
}
