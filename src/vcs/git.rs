//! Repository access using git2-rs.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::{Commit, ErrorCode, Oid, Repository, Sort};
use tracing::{debug, warn};

use crate::error::VcsError;

use super::{CommitLine, VersionControl};

/// [`VersionControl`] backed by libgit2.
///
/// References are looked up by name through the object database, so project
/// and tag names are never interpreted by a shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Git2Backend {
    pub fn new() -> Self {
        Self
    }
}

impl VersionControl for Git2Backend {
    fn list_tags(&self, workdir: &Path) -> Result<Vec<String>, VcsError> {
        let repo = open_repository(workdir)?;
        let names = repo.tag_names(None).map_err(VcsError::ListTags)?;

        let mut tags = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            match name {
                Some(name) => tags.push(name.to_string()),
                None => warn!(index, "Skipping tag whose name is not valid UTF-8"),
            }
        }

        debug!(path = %workdir.display(), count = tags.len(), "Listed tags");
        Ok(tags)
    }

    fn log_between(
        &self,
        workdir: &Path,
        from_ref: &str,
        to_ref: &str,
        exclude: &str,
    ) -> Result<Vec<CommitLine>, VcsError> {
        let repo = open_repository(workdir)?;
        let from = resolve_tag(&repo, from_ref)?;
        let to = resolve_tag(&repo, to_ref)?;

        let mut revwalk = repo.revwalk().map_err(VcsError::Revwalk)?;
        revwalk.push(to).map_err(VcsError::Revwalk)?;
        revwalk.hide(from).map_err(VcsError::Revwalk)?;
        revwalk.set_sorting(Sort::TIME).map_err(VcsError::Revwalk)?;

        let mut lines = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(VcsError::Revwalk)?;
            let commit = repo.find_commit(oid).map_err(VcsError::Revwalk)?;

            let message = String::from_utf8_lossy(commit.message_bytes());
            if !exclude.is_empty() && message.contains(exclude) {
                continue;
            }

            lines.push(commit_line(&commit)?);
        }

        debug!(
            path = %workdir.display(),
            from = from_ref,
            to = to_ref,
            count = lines.len(),
            "Collected commits"
        );
        Ok(lines)
    }
}

fn open_repository(workdir: &Path) -> Result<Repository, VcsError> {
    if !workdir.is_dir() {
        return Err(VcsError::ProjectNotFound {
            path: workdir.to_path_buf(),
        });
    }

    Repository::open(workdir).map_err(|source| VcsError::NotARepository {
        path: workdir.to_path_buf(),
        source,
    })
}

/// Resolve a tag name (e.g. `release/1.2.0`) to the commit it points at.
///
/// Annotated tags are peeled to their target commit.
fn resolve_tag(repo: &Repository, name: &str) -> Result<Oid, VcsError> {
    let unknown = || VcsError::UnknownTag {
        tag: name.to_string(),
    };

    let reference = match repo.find_reference(&format!("refs/tags/{}", name)) {
        Ok(reference) => reference,
        Err(e) if e.code() == ErrorCode::NotFound => return Err(unknown()),
        Err(e) => {
            debug!(tag = name, error = %e, "Tag lookup failed");
            return Err(unknown());
        }
    };

    reference
        .peel_to_commit()
        .map(|commit| commit.id())
        .map_err(|_| unknown())
}

fn commit_line(commit: &Commit) -> Result<CommitLine, VcsError> {
    let short_hash = commit
        .as_object()
        .short_id()
        .map_err(VcsError::Revwalk)?
        .as_str()
        .unwrap_or_default()
        .to_string();

    let author = commit.author();

    Ok(CommitLine {
        subject: commit
            .summary_bytes()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .unwrap_or_default(),
        short_hash,
        date: author_date(commit),
        author: String::from_utf8_lossy(author.name_bytes()).into_owned(),
    })
}

fn author_date(commit: &Commit) -> DateTime<FixedOffset> {
    let time = commit.author().when();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .unwrap_or_else(|| Utc.fix());

    offset
        .timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_else(|| Utc::now().with_timezone(&offset))
}
