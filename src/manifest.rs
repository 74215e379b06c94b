//! Release manifests and the per-manifest aggregations built on them.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::VcsError;
use crate::report::{ManifestTags, ProjectTags};
use crate::tickets::list_tickets;
use crate::vcs::VersionControl;

/// A named snapshot of the version each project was deployed at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project_versions: Vec<ProjectVersion>,
}

/// One project's version inside a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectVersion {
    pub name: String,
    pub version: String,
}

/// Two consecutive manifests; tickets are collected from previous to current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestPair {
    pub current_manifest: Manifest,
    pub previous_manifest: Manifest,
}

/// A project's release range between two manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRange {
    pub project: String,
    pub start: String,
    pub end: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_versions: Vec::new(),
        }
    }

    /// Builder-style helper to record a project's version.
    pub fn with_project(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.project_versions.push(ProjectVersion {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    /// The version recorded for `project`, if the manifest lists it.
    pub fn find_version(&self, project: &str) -> Option<&str> {
        self.project_versions
            .iter()
            .find(|pv| pv.name == project)
            .map(|pv| pv.version.as_str())
    }
}

/// Pair every manifest with its predecessor, oldest first.
pub fn pair_consecutive(manifests: &[Manifest]) -> Vec<ManifestPair> {
    manifests
        .windows(2)
        .map(|window| ManifestPair {
            current_manifest: window[1].clone(),
            previous_manifest: window[0].clone(),
        })
        .collect()
}

/// Release ranges for every configured project listed in both manifests.
///
/// Projects missing from either manifest are skipped.
pub fn ticket_ranges(
    projects: &[String],
    current: &Manifest,
    previous: &Manifest,
) -> Vec<TicketRange> {
    projects
        .iter()
        .filter_map(|project| {
            match (previous.find_version(project), current.find_version(project)) {
                (Some(start), Some(end)) => Some(TicketRange {
                    project: project.clone(),
                    start: start.to_string(),
                    end: end.to_string(),
                }),
                _ => {
                    debug!(
                        project = %project,
                        manifest = %current.name,
                        "Project not in both manifests, skipping"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Deduplicated tickets shipped between `previous` and `current`.
pub fn tickets_for_manifest(
    vcs: &dyn VersionControl,
    root: &Path,
    projects: &[String],
    current: &Manifest,
    previous: &Manifest,
) -> Result<BTreeSet<String>, VcsError> {
    let mut tickets = BTreeSet::new();

    for range in ticket_ranges(projects, current, previous) {
        tickets.extend(list_tickets(
            vcs,
            root,
            &range.project,
            &range.start,
            &range.end,
        )?);
    }

    Ok(tickets)
}

/// Release versions shipped by each manifest, oldest manifest first.
///
/// The first manifest anchors each project at its recorded version. Every
/// later manifest receives the versions after the previous anchor up to and
/// including its own version, and becomes the new anchor. A version that is
/// not among the project's release tags, or that lies before the anchor, is
/// reported on its own. Projects without an entry in `projects_tags` are
/// skipped.
pub fn tags_for_manifests(
    projects_tags: &[ProjectTags],
    manifests: &[Manifest],
) -> Vec<ManifestTags> {
    let Some(first) = manifests.first() else {
        return Vec::new();
    };

    let known: HashMap<&str, &[String]> = projects_tags
        .iter()
        .map(|pt| (pt.project_name.as_str(), pt.tags.as_slice()))
        .collect();

    let mut cursors: HashMap<&str, usize> = known
        .iter()
        .map(|(&name, tags)| {
            let start = first
                .find_version(name)
                .and_then(|version| tags.iter().position(|tag| tag == version))
                .unwrap_or(0);
            (name, start)
        })
        .collect();

    manifests
        .iter()
        .map(|manifest| {
            let mut projects = Vec::new();

            for pv in &manifest.project_versions {
                let Some(tags) = known.get(pv.name.as_str()) else {
                    continue;
                };
                let Some(cursor) = cursors.get_mut(pv.name.as_str()) else {
                    continue;
                };

                let end = tags.iter().position(|tag| *tag == pv.version).map(|i| i + 1);
                let shipped = match end {
                    Some(end) if end >= *cursor => {
                        let range = tags[*cursor..end].to_vec();
                        *cursor = end;
                        range
                    }
                    _ => vec![pv.version.clone()],
                };

                projects.push(ProjectTags {
                    project_name: pv.name.clone(),
                    tags: shipped,
                });
            }

            ManifestTags {
                manifest_name: manifest.name.clone(),
                projects_tags: projects,
            }
        })
        .collect()
}
