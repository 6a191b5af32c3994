//! Dotfile management engine.
//!
//! dfm keeps directories of configuration files ("profiles", usually git
//! repositories) and projects them into the home directory as symbolic
//! links, keeping each profile synchronized with its remote. A profile can
//! compose child profiles ("modules"), each independently linkable and
//! syncable with an explicit ordering relative to its parent.
//!
//! The crate is organised leaf-first:
//!
//! - **[`mappings`]** — pure rule evaluation deciding whether and where a
//!   file is linked
//! - **[`links`]** — turns tracked files into symlinks, with data-loss
//!   guards
//! - **[`hooks`]** — shell commands around lifecycle events
//! - **[`repo`]** — the git collaborator (libgit2 queries, external git for
//!   everything interactive)
//! - **[`profile`]** — the aggregate composing all of the above plus child
//!   modules
//! - **[`commands`]** — CLI subcommand orchestration

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod hooks;
pub mod links;
pub mod logging;
pub mod mappings;
pub mod profile;
pub mod repo;
pub mod state;

pub use config::{LinkMode, ModuleConfig, ProfileConfig};
pub use error::{ConfigError, DfmError, GitError, HookError, LinkError, StateError};
pub use hooks::{HookCommand, Hooks};
pub use links::{Link, LinkManager};
pub use mappings::{Evaluation, Mapping, MappingConfig, MappingSet};
pub use profile::{Profile, get_name};
pub use repo::DotfileRepo;
pub use state::State;
