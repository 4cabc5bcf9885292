//! TestRepo builder: temporary git repositories with controlled content
//!
//! Tests use tempfile-backed repos instead of committed fixture trees; every
//! helper shells out to the real git binary, matching what the engine itself
//! does at runtime.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create an empty directory (not yet a git repository)
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Create an initialised git repository
    pub fn with_git() -> Self {
        let repo = Self::new();
        repo.init_git();
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    pub fn remove_file(&self, relative_path: &str) -> &Self {
        fs::remove_file(self.dir.path().join(relative_path)).expect("Failed to remove file");
        self
    }

    /// Run an arbitrary git command inside the repo
    pub fn git(&self, args: &[&str]) -> Output {
        Command::new("git")
            .current_dir(self.path())
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("Failed to run git {args:?}: {e}"))
    }

    pub fn init_git(&self) -> &Self {
        self.git(&["init", "-b", "main"]);
        self.git(&["config", "user.email", "test@test.com"]);
        self.git(&["config", "user.name", "Test User"]);
        self
    }

    /// Stage everything and commit
    pub fn commit(&self, message: &str) -> &Self {
        self.git(&["add", "-A"]);
        let output = self.git(&["commit", "-m", message]);
        assert!(
            output.status.success(),
            "git commit failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        self
    }

    pub fn head_sha(&self) -> String {
        let output = self.git(&["rev-parse", "HEAD"]);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Rename a tracked file through git so rename detection sees it
    pub fn git_mv(&self, from: &str, to: &str) -> &Self {
        let output = self.git(&["mv", from, to]);
        assert!(
            output.status.success(),
            "git mv failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        self
    }
}
