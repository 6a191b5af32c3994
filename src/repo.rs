//! The git collaborator.
//!
//! One [`DotfileRepo`] wraps one on-disk directory that is (or will become)
//! a git working tree. Read-only queries — dirtiness, remote presence,
//! tracked-file discovery — go through libgit2 so there is nothing to
//! parse; everything that mutates history or talks to the network shells
//! out to the external `git` binary with stdio inherited, so credential
//! prompts, editors, and pagers behave exactly as they do for a bare
//! `git` invocation. A git failure is reported with the failing command
//! and aborts the operation; the user resolves conflicts with git itself.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use git2::{Repository, StatusOptions};
use tracing::info;

use crate::error::GitError;
use crate::exec;

/// Commit message fallback when nothing else is configured.
const DEFAULT_COMMIT_MSG: &str = "Files managed by dfm";

/// Placeholder used in dry runs so no prompt fires.
const DRY_RUN_COMMIT_MSG: &str = "noop";

/// A git repository storing dotfiles.
#[derive(Debug, Clone)]
pub struct DotfileRepo {
    path: PathBuf,
    branch: String,
    commit_msg: String,
    prompt_for_commit_message: bool,
}

impl DotfileRepo {
    /// Bind a repository at `path`.
    ///
    /// `commit_msg` may be empty, in which case the sync protocol falls
    /// through to the prompt/default chain.
    #[must_use]
    pub fn new(
        path: PathBuf,
        branch: String,
        commit_msg: String,
        prompt_for_commit_message: bool,
    ) -> Self {
        Self {
            path,
            branch,
            commit_msg,
            prompt_for_commit_message,
        }
    }

    /// The working tree location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The branch synced against, `master` unless configured otherwise.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Initialise a fresh repository at this location. No network involved.
    pub fn init(&self) -> Result<(), GitError> {
        Repository::init(&self.path)?;
        Ok(())
    }

    /// Whether the working tree has uncommitted changes, untracked files
    /// included.
    pub fn is_dirty(&self) -> Result<bool, GitError> {
        let repo = Repository::open(&self.path)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        Ok(!repo.statuses(Some(&mut opts))?.is_empty())
    }

    /// Whether a remote named `origin` is configured.
    #[must_use]
    pub fn has_origin(&self) -> bool {
        match Repository::open(&self.path) {
            Ok(repo) => repo.find_remote("origin").is_ok(),
            Err(_) => false,
        }
    }

    /// The URL of `origin`, when configured.
    #[must_use]
    pub fn remote_url(&self) -> Option<String> {
        let repo = Repository::open(&self.path).ok()?;
        let remote = repo.find_remote("origin").ok()?;
        remote.url().map(str::to_string)
    }

    /// Every file of interest to the link pass: tracked files plus
    /// untracked-but-not-ignored ones, relative to the working tree root.
    ///
    /// Equivalent to `git ls-files --others --cached --exclude-standard`.
    /// `.gitignore`d build artifacts never appear here, which is why link
    /// generation must use this and never a raw directory walk. A missing
    /// repository is a hard error, not a fallback.
    pub fn tracked_files(&self) -> Result<Vec<PathBuf>, GitError> {
        let repo = Repository::open(&self.path)?;
        let mut files = BTreeSet::new();

        let index = repo.index()?;
        for entry in index.iter() {
            files.insert(PathBuf::from(
                String::from_utf8_lossy(&entry.path).into_owned(),
            ));
        }

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        for status in repo.statuses(Some(&mut opts))?.iter() {
            if status.status().contains(git2::Status::WT_NEW)
                && let Some(path) = status.path()
            {
                files.insert(PathBuf::from(path));
            }
        }

        Ok(files.into_iter().collect())
    }

    /// Run a git subcommand in this repository with stdio passed through.
    ///
    /// Fails fast on a non-zero exit, reporting the failing command line.
    pub fn git(&self, args: &[&str]) -> Result<(), GitError> {
        ensure_git()?;
        let command = exec::display_command("git", args);
        match exec::run_interactive(&self.path, "git", args) {
            Ok(0) => Ok(()),
            Ok(code) => Err(GitError::Failed { command, code }),
            Err(source) => Err(GitError::Spawn { command, source }),
        }
    }

    /// Like [`git`](Self::git), but in dry-run mode only logs the command.
    fn git_or_log(&self, args: &[&str], dry_run: bool) -> Result<(), GitError> {
        if dry_run {
            info!("would run: {}", exec::display_command("git", args));
            return Ok(());
        }
        self.git(args)
    }

    /// Rebase-pull the configured branch from origin.
    pub fn pull(&self, dry_run: bool) -> Result<(), GitError> {
        self.git_or_log(&["pull", "--rebase", "origin", &self.branch], dry_run)
    }

    /// Run the full sync protocol against this working tree.
    ///
    /// Commit local changes when dirty, then rebase-pull and (if there was
    /// anything to commit) push — but only when an `origin` remote exists;
    /// a local-only repository syncs without touching the network and that
    /// is not an error.
    pub fn sync(&self, commit_msg: Option<&str>, dry_run: bool) -> Result<(), GitError> {
        info!("syncing {}", self.path.display());
        let dirty = self.is_dirty()?;

        if dirty {
            self.git_or_log(&["--no-pager", "diff"], dry_run)?;
            let msg = self.commit_message(commit_msg, dry_run)?;
            self.git_or_log(&["add", "--all"], dry_run)?;
            self.git_or_log(&["commit", "-m", &msg], dry_run)?;
        }

        if self.has_origin() {
            self.git_or_log(&["pull", "--rebase", "origin", &self.branch], dry_run)?;
            if dirty {
                self.git_or_log(&["push", "origin", &self.branch], dry_run)?;
            }
        }

        Ok(())
    }

    /// Pick the commit message: explicit argument, then the configured
    /// message, then a dry-run placeholder, then an interactive prompt when
    /// enabled, then the fixed default.
    fn commit_message(&self, explicit: Option<&str>, dry_run: bool) -> Result<String, GitError> {
        if let Some(msg) = explicit.filter(|msg| !msg.is_empty()) {
            return Ok(msg.to_string());
        }
        if !self.commit_msg.is_empty() {
            return Ok(self.commit_msg.clone());
        }
        if dry_run {
            return Ok(DRY_RUN_COMMIT_MSG.to_string());
        }
        if self.prompt_for_commit_message {
            return prompt_commit_message();
        }
        Ok(DEFAULT_COMMIT_MSG.to_string())
    }

    /// Clone `url` into `dest` with the external git binary so credential
    /// prompts work. Used for module population and `dfm clone`.
    pub fn clone_from(url: &str, dest: &Path, branch: Option<&str>) -> Result<(), GitError> {
        ensure_git()?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GitError::Spawn {
                command: format!("git clone {url}"),
                source,
            })?;
        }
        let dest_str = dest.to_string_lossy().into_owned();
        let mut args = vec!["clone"];
        if let Some(branch) = branch {
            args.extend(["--single-branch", "--branch", branch]);
        }
        args.push(url);
        args.push(&dest_str);

        let cwd = dest.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let command = exec::display_command("git", &args);
        match exec::run_interactive(&cwd, "git", &args) {
            Ok(0) => Ok(()),
            Ok(code) => Err(GitError::Failed { command, code }),
            Err(source) => Err(GitError::Spawn { command, source }),
        }
    }
}

/// Verify the external git binary exists before trying to spawn it.
fn ensure_git() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(GitError::MissingBinary)
}

fn prompt_commit_message() -> Result<String, GitError> {
    print!("Commit message: ");
    let flush_err = |source| GitError::Spawn {
        command: "commit message prompt".to_string(),
        source,
    };
    std::io::stdout().flush().map_err(flush_err)?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input).map_err(flush_err)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn repo_fixture() -> (tempfile::TempDir, DotfileRepo) {
        let tmp = tempfile::tempdir().unwrap();
        let repo = DotfileRepo::new(
            tmp.path().to_path_buf(),
            "master".to_string(),
            String::new(),
            false,
        );
        repo.init().unwrap();
        (tmp, repo)
    }

    #[test]
    fn init_creates_a_repository() {
        let (tmp, _repo) = repo_fixture();
        assert!(tmp.path().join(".git").is_dir());
    }

    #[test]
    fn missing_repository_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = DotfileRepo::new(
            tmp.path().to_path_buf(),
            "master".to_string(),
            String::new(),
            false,
        );
        assert!(matches!(
            repo.tracked_files(),
            Err(GitError::Repository(_))
        ));
        assert!(matches!(repo.is_dirty(), Err(GitError::Repository(_))));
    }

    #[test]
    fn fresh_repository_is_clean_and_local_only() {
        let (_tmp, repo) = repo_fixture();
        assert!(!repo.is_dirty().unwrap());
        assert!(!repo.has_origin());
        assert!(repo.remote_url().is_none());
        assert!(repo.tracked_files().unwrap().is_empty());
    }

    #[test]
    fn untracked_files_make_the_tree_dirty_and_are_discovered() {
        let (tmp, repo) = repo_fixture();
        std::fs::write(tmp.path().join("vimrc"), "set nocompatible").unwrap();
        std::fs::create_dir_all(tmp.path().join("bin")).unwrap();
        std::fs::write(tmp.path().join("bin/tool"), "#!/bin/sh").unwrap();

        assert!(repo.is_dirty().unwrap());
        let files = repo.tracked_files().unwrap();
        assert!(files.contains(&PathBuf::from("vimrc")));
        assert!(files.contains(&PathBuf::from("bin/tool")));
    }

    #[test]
    fn ignored_files_are_not_discovered() {
        let (tmp, repo) = repo_fixture();
        std::fs::write(tmp.path().join(".gitignore"), "*.log\n").unwrap();
        std::fs::write(tmp.path().join("build.log"), "noise").unwrap();
        std::fs::write(tmp.path().join("vimrc"), "").unwrap();

        let files = repo.tracked_files().unwrap();
        assert!(files.contains(&PathBuf::from("vimrc")));
        assert!(files.contains(&PathBuf::from(".gitignore")));
        assert!(!files.contains(&PathBuf::from("build.log")));
    }

    #[test]
    fn commit_message_priority() {
        let tmp = tempfile::tempdir().unwrap();
        let mut repo = DotfileRepo::new(
            tmp.path().to_path_buf(),
            "master".to_string(),
            String::new(),
            false,
        );

        // Explicit argument wins over everything.
        repo.commit_msg = "configured".to_string();
        assert_eq!(
            repo.commit_message(Some("explicit"), true).unwrap(),
            "explicit"
        );
        // Configured message beats the dry-run placeholder.
        assert_eq!(repo.commit_message(None, true).unwrap(), "configured");

        repo.commit_msg = String::new();
        assert_eq!(repo.commit_message(None, true).unwrap(), DRY_RUN_COMMIT_MSG);
        // No prompt configured: the fixed default applies.
        assert_eq!(
            repo.commit_message(None, false).unwrap(),
            DEFAULT_COMMIT_MSG
        );
        // An empty explicit message does not shadow the chain.
        assert_eq!(
            repo.commit_message(Some(""), false).unwrap(),
            DEFAULT_COMMIT_MSG
        );
    }

    #[test]
    fn dry_run_sync_leaves_the_tree_dirty() {
        let (tmp, repo) = repo_fixture();
        std::fs::write(tmp.path().join("vimrc"), "").unwrap();

        repo.sync(None, true).unwrap();
        assert!(repo.is_dirty().unwrap());
    }
}
