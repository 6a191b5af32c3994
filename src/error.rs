//! Domain-specific error types for the dfm engine.
//!
//! Internal modules return typed errors ([`ConfigError`], [`GitError`],
//! [`LinkError`], [`StateError`]) while command handlers at the CLI boundary
//! convert them to [`anyhow::Error`] via the standard `?` operator. The
//! aggregate [`DfmError`] exists so that the profile layer, which touches
//! every collaborator, can propagate any of them with one return type.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the dfm engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum DfmError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A git query or invocation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A symlink operation failed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A lifecycle hook could not be started.
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Errors that arise from loading and validating `.dfm.yml` files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file contains invalid YAML.
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying deserialization error.
        source: serde_yaml::Error,
    },

    /// A mapping's `match` field is not a valid regular expression.
    #[error("invalid mapping pattern '{pattern}': {source}")]
    BadPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex compile error.
        source: regex::Error,
    },

    /// A `link_as_dir` mapping names a path that is not a directory under
    /// the profile root.
    #[error("could not resolve '{pattern}' to a directory in the profile")]
    NotADirectory {
        /// The `match` value of the offending mapping.
        pattern: String,
    },

    /// A module entry has neither `repo` nor `repository`.
    #[error("module '{name}' does not declare a repository URL")]
    ModuleWithoutRepo {
        /// Module name, or `?` when the name could not be derived either.
        name: String,
    },

    /// Module nesting exceeded the fixed recursion limit.
    #[error("module nesting deeper than {limit} levels at {}", location.display())]
    ModuleDepthExceeded {
        /// Maximum supported depth.
        limit: usize,
        /// Location of the module that crossed the limit.
        location: PathBuf,
    },
}

/// Errors that arise from the git collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    /// No usable `git` executable on `PATH`.
    #[error("git executable not found on PATH: {0}")]
    MissingBinary(#[source] which::Error),

    /// An external git process could not be spawned.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The command line that failed, e.g. `git pull --rebase origin master`.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external git process exited non-zero.
    #[error("'{command}' exited with status {code}")]
    Failed {
        /// The command line that failed.
        command: String,
        /// Exit code, or `-1` when terminated by a signal.
        code: i32,
    },

    /// A libgit2 query failed (repository missing, corrupt, etc.).
    #[error("git repository error: {0}")]
    Repository(#[from] git2::Error),
}

/// Errors that arise from applying symlinks.
#[derive(Error, Debug)]
pub enum LinkError {
    /// An existing destination could not be removed.
    #[error("cannot remove {}: {source}", path.display())]
    Remove {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An intermediate directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        /// Path that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The symlink itself could not be created.
    #[error("cannot link {} -> {}: {source}", dst.display(), src.display())]
    Create {
        /// Link source (file inside the profile).
        src: PathBuf,
        /// Link destination.
        dst: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from running lifecycle hooks.
///
/// A hook that exits non-zero is only warned about; this error covers the
/// case where the interpreter process could not be started at all.
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook interpreter could not be spawned.
    #[error("failed to spawn hook '{name}' command '{command}': {source}")]
    Spawn {
        /// Hook event name.
        name: String,
        /// The command that failed to start.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from the process-wide state file.
#[derive(Error, Debug)]
pub enum StateError {
    /// The state file could not be read or written.
    #[error("cannot access state file {}: {source}", path.display())]
    Io {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The state file contains invalid JSON.
    #[error("invalid state file {}: {source}", path.display())]
    Json {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },
}
