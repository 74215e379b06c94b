//! Release tag extraction and version ordering.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::VcsError;
use crate::vcs::VersionControl;

/// Prefix shared by every release tag.
pub const RELEASE_PREFIX: &str = "release/";

static RELEASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^release/(\d+\.\d+(?:\.\d+)?)").expect("release tag pattern is valid")
});

/// Numeric components of a release version, ordered by version precedence.
///
/// Components compare numerically left to right; when one version is a
/// prefix of the other the shorter one sorts first (`1.2 < 1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion {
    parts: Vec<u64>,
}

impl ReleaseVersion {
    /// Parse a dotted numeric version such as `1.2` or `1.2.3`.
    pub fn parse(version: &str) -> Option<Self> {
        let parts = version
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        if parts.is_empty() {
            return None;
        }

        Some(Self { parts })
    }
}

/// Extract the version from a release tag name.
///
/// `release/1.2.0` yields `1.2.0`; tags without the `release/` prefix yield
/// `None`.
pub fn release_version(tag: &str) -> Option<&str> {
    RELEASE_TAG
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Build the tag name for a release version.
pub fn release_tag(version: &str) -> String {
    format!("{}{}", RELEASE_PREFIX, version)
}

/// Extract release versions from tag names, ascending by version precedence.
pub fn release_versions<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions: Vec<String> = tags
        .into_iter()
        .filter_map(|tag| release_version(tag.as_ref()).map(str::to_string))
        .collect();

    versions.sort_by(|a, b| compare_versions(a, b));
    versions
}

/// Compare two version strings by precedence, falling back to text order
/// for anything that does not parse.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (ReleaseVersion::parse(a), ReleaseVersion::parse(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// List the release versions of `project` under `root`.
pub fn list_tags(
    vcs: &dyn VersionControl,
    root: &Path,
    project: &str,
) -> Result<Vec<String>, VcsError> {
    let tags = vcs.list_tags(&root.join(project))?;
    Ok(release_versions(tags))
}
