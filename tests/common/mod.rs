//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{ObjectType, Oid, Repository, Signature, Time};

/// A directory holding several project working copies.
pub struct ProjectsRoot {
    pub dir: tempfile::TempDir,
}

impl ProjectsRoot {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Initialise a repository for `name` under the root.
    pub fn project(&self, name: &str) -> TestRepo {
        TestRepo::init(self.dir.path().join(name))
    }

    /// Create a plain directory that is not a repository.
    pub fn plain_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub path: PathBuf,
    pub repo: Repository,
    clock: std::cell::Cell<i64>,
}

impl TestRepo {
    /// Create a new repository at `path`.
    pub fn init(path: PathBuf) -> Self {
        std::fs::create_dir_all(&path).expect("Failed to create repo directory");
        let repo = Repository::init(&path).expect("Failed to init git repo");
        Self {
            path,
            repo,
            clock: std::cell::Cell::new(1_700_000_000),
        }
    }

    /// One minute after the previous timestamp, so commit dates are strictly ordered.
    fn tick(&self) -> i64 {
        let now = self.clock.get() + 60;
        self.clock.set(now);
        now
    }

    fn signature(&self) -> Signature<'static> {
        Signature::new("Test User", "test@example.com", &Time::new(self.tick(), 0))
            .expect("Failed to create signature")
    }

    /// Create a commit with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();

        let file_path = self.path.join("test.txt");
        std::fs::write(&file_path, format!("{}\n{}", message, self.clock.get()))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new("test.txt"))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a commit whose message is written byte for byte, which allows
    /// messages that are not valid UTF-8. Requires an existing commit on HEAD.
    pub fn commit_raw_message(&self, message: &[u8]) -> Oid {
        let head = self.repo.head().expect("Failed to read HEAD");
        let branch = head.name().expect("HEAD is not a branch").to_string();
        let parent = head.peel_to_commit().expect("Failed to peel HEAD");
        let now = self.tick();

        let mut raw = format!(
            "tree {}\nparent {}\nauthor Test User <test@example.com> {} +0000\ncommitter Test User <test@example.com> {} +0000\n\n",
            parent.tree_id(),
            parent.id(),
            now,
            now
        )
        .into_bytes();
        raw.extend_from_slice(message);

        let oid = self
            .repo
            .odb()
            .expect("Failed to open object database")
            .write(ObjectType::Commit, &raw)
            .expect("Failed to write commit object");
        self.repo
            .reference(&branch, oid, true, "raw commit")
            .expect("Failed to move branch");
        oid
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, false)
            .expect("Failed to create annotated tag");
    }

    /// Commit and tag `release/<version>` in one step.
    pub fn release(&self, version: &str) -> Oid {
        let oid = self.commit(&format!("Release {}", version));
        self.tag_lightweight(&format!("release/{}", version), oid);
        oid
    }
}

/// Convert project names into the owned list the library takes.
pub fn names(projects: &[&str]) -> Vec<String> {
    projects.iter().map(|p| p.to_string()).collect()
}
