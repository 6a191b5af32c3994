// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed profile fixture so each test can
// set up an isolated profile, target directory, and git repository without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::process::Command;

use dfm::Profile;

/// Run a git command in `dir`, panicking on failure (tests only).
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Initialise a git repository with a throwaway commit identity so commits
/// made by sync tests do not depend on the host's global config.
pub fn git_init(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "user.email", "tests@example.com"]);
    git(dir, &["config", "user.name", "dfm tests"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// An isolated profile backed by a [`tempfile::TempDir`]: a git-initialised
/// profile directory plus a scratch target directory links land in.
pub struct TestProfile {
    /// Owns every path below; removed on drop.
    pub root: tempfile::TempDir,
    /// The profile working tree.
    pub profile: PathBuf,
    /// The directory links are created under.
    pub target: PathBuf,
}

impl TestProfile {
    /// Create a fresh profile with an empty `.dfm.yml` pointing
    /// `target_dir` at the scratch target.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let profile = root.path().join("profile");
        let target = root.path().join("target");
        std::fs::create_dir_all(&profile).expect("create profile dir");
        std::fs::create_dir_all(&target).expect("create target dir");
        git_init(&profile);

        let fixture = Self {
            root,
            profile,
            target,
        };
        fixture.config("");
        fixture
    }

    /// Overwrite the profile's `.dfm.yml`. The `target_dir` key is always
    /// prepended so links stay inside the fixture.
    pub fn config(&self, yaml: &str) {
        let contents = format!("target_dir: {}\n{yaml}", self.target.display());
        std::fs::write(self.profile.join(".dfm.yml"), contents).expect("write .dfm.yml");
    }

    /// Write a file into the profile, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.profile.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write profile file");
        path
    }

    /// Load the profile through the public API.
    pub fn load(&self) -> Profile {
        Profile::load(&self.profile).expect("load profile")
    }

    /// Create a sibling directory that can serve as a module location.
    pub fn module_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        std::fs::create_dir_all(&dir).expect("create module dir");
        dir
    }

    /// Whether `rel` under the target directory is a symlink pointing at
    /// `src`. Both sides are canonicalised so the comparison survives
    /// symlinked temp directories.
    pub fn is_linked_to(&self, rel: &str, src: &Path) -> bool {
        let Ok(found) = std::fs::read_link(self.target.join(rel)) else {
            return false;
        };
        match (std::fs::canonicalize(&found), std::fs::canonicalize(src)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
