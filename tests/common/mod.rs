//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature, Time};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a template fixture.
pub fn template_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("templates").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a commit with the given message touching `test.txt`. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let content = format!(
            "{}\n{}",
            message,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        );
        self.commit_file("test.txt", &content, message)
    }

    /// Write one file and commit it as "Test User".
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        self.stage_file(path, content);
        self.commit_staged(message, &Self::signature("Test User", "test@example.com"))
    }

    /// Write one file and commit it with the given author.
    pub fn commit_file_as(
        &self,
        path: &str,
        content: &str,
        message: &str,
        name: &str,
        email: &str,
    ) -> Oid {
        self.stage_file(path, content);
        self.commit_staged(message, &Self::signature(name, email))
    }

    /// Write one file and commit it `days` days in the past.
    pub fn commit_file_days_ago(&self, path: &str, content: &str, message: &str, days: i64) -> Oid {
        self.stage_file(path, content);
        let seconds = chrono::Utc::now().timestamp() - days * 24 * 60 * 60;
        let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to create signature");
        self.commit_staged(message, &sig)
    }

    /// Delete a tracked file and commit the removal.
    pub fn remove_file(&self, path: &str, message: &str) -> Oid {
        std::fs::remove_file(self.path().join(path)).expect("Failed to remove file");
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .remove_path(Path::new(path))
            .expect("Failed to remove from index");
        index.write().expect("Failed to write index");
        self.commit_staged(message, &Self::signature("Test User", "test@example.com"))
    }

    /// Move a tracked file and commit the rename.
    pub fn rename_file(&self, from: &str, to: &str, message: &str) -> Oid {
        let target = self.path().join(to);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::rename(self.path().join(from), &target).expect("Failed to rename file");
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .remove_path(Path::new(from))
            .expect("Failed to remove from index");
        index.add_path(Path::new(to)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        self.commit_staged(message, &Self::signature("Test User", "test@example.com"))
    }

    /// Create a merge commit on HEAD with `other` as second parent.
    pub fn merge(&self, other: Oid, message: &str) -> Oid {
        let sig = Self::signature("Test User", "test@example.com");
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to read HEAD");
        let other = self.repo.find_commit(other).expect("Failed to find commit");
        let tree = head.tree().expect("Failed to read tree");
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &other])
            .expect("Failed to create merge commit")
    }

    /// Create a commit on a side line of history without moving HEAD.
    pub fn side_commit(&self, parent: Oid, path: &str, content: &str, message: &str) -> Oid {
        let sig = Self::signature("Test User", "test@example.com");
        let parent = self.repo.find_commit(parent).expect("Failed to find commit");
        let blob = self
            .repo
            .blob(content.as_bytes())
            .expect("Failed to write blob");
        let mut builder = self
            .repo
            .treebuilder(Some(&parent.tree().expect("Failed to read tree")))
            .expect("Failed to create tree builder");
        builder
            .insert(path, blob, 0o100644)
            .expect("Failed to insert blob");
        let tree_id = builder.write().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        self.repo
            .commit(None, &sig, &sig, message, &tree, &[&parent])
            .expect("Failed to create side commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self
            .repo
            .find_object(oid, None)
            .expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
    }

    /// Detach HEAD at the given OID.
    pub fn detach(&self, oid: Oid) {
        self.repo.set_head_detached(oid).expect("Failed to detach HEAD");
    }

    fn signature(name: &str, email: &str) -> Signature<'static> {
        Signature::now(name, email).expect("Failed to create signature")
    }

    fn stage_file(&self, path: &str, content: &str) {
        write_file(self.path(), path, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    fn commit_staged(&self, message: &str, sig: &Signature<'_>) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), sig, sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }
}
