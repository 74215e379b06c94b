//! Batch operations behind the command-line tools.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::batch::{Job, Runner};
use crate::error::VcsError;
use crate::manifest::{Manifest, ManifestPair, tags_for_manifests, ticket_ranges};
use crate::report::{ManifestTags, ManifestTickets, ProjectTags};
use crate::tags::list_tags;
use crate::tickets::list_tickets;

/// Release versions of every project, in project order.
pub async fn find_tags_for_projects(
    runner: &Runner,
    root: &Path,
    projects: &[String],
) -> Result<Vec<ProjectTags>, VcsError> {
    let jobs = projects
        .iter()
        .map(|project| {
            let root = root.to_path_buf();
            let name = project.clone();
            Job::new(project.clone(), move |vcs| list_tags(vcs, &root, &name))
        })
        .collect();

    let tags = runner.run(jobs).await?;

    Ok(projects
        .iter()
        .cloned()
        .zip(tags)
        .map(|(project_name, tags)| ProjectTags { project_name, tags })
        .collect())
}

/// Deduplicated tickets for each manifest pair, in input order.
pub async fn find_tickets_for_manifests(
    runner: &Runner,
    root: &Path,
    projects: &[String],
    pairs: &[ManifestPair],
) -> Result<Vec<ManifestTickets>, VcsError> {
    let mut owners = Vec::new();
    let mut jobs = Vec::new();

    for (index, pair) in pairs.iter().enumerate() {
        for range in ticket_ranges(projects, &pair.current_manifest, &pair.previous_manifest) {
            let root: PathBuf = root.to_path_buf();
            owners.push(index);
            jobs.push(Job::new(range.project.clone(), move |vcs| {
                list_tickets(vcs, &root, &range.project, &range.start, &range.end)
            }));
        }
    }

    debug!(manifests = pairs.len(), ranges = jobs.len(), "Collecting tickets");

    let mut sets = vec![BTreeSet::new(); pairs.len()];
    for (owner, tickets) in owners.into_iter().zip(runner.run(jobs).await?) {
        sets[owner].extend(tickets);
    }

    Ok(pairs
        .iter()
        .zip(sets)
        .map(|(pair, tickets)| ManifestTickets {
            manifest_name: pair.current_manifest.name.clone(),
            tickets: tickets.into_iter().collect(),
        })
        .collect())
}

/// Release versions shipped by each manifest, oldest manifest first.
pub async fn find_tags_for_manifests(
    runner: &Runner,
    root: &Path,
    projects: &[String],
    manifests: &[Manifest],
) -> Result<Vec<ManifestTags>, VcsError> {
    if manifests.is_empty() {
        return Ok(Vec::new());
    }

    let projects_tags = find_tags_for_projects(runner, root, projects).await?;
    Ok(tags_for_manifests(&projects_tags, manifests))
}
