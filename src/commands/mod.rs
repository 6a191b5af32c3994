//! Top-level subcommand orchestration.
//!
//! Each submodule implements one CLI subcommand as a `run` function taking
//! its options struct and returning [`anyhow::Result`]. The helpers here
//! resolve "the current profile" from the process-wide state file; every
//! command that operates without an explicit profile argument goes through
//! them.

pub mod add;
pub mod clean;
pub mod clone;
pub mod completions;
pub mod git;
pub mod init;
pub mod link;
pub mod list;
pub mod remove;
pub mod run_hook;
pub mod sync;
pub mod where_cmd;

use anyhow::{Context as _, Result, bail};

use crate::profile::Profile;
use crate::state::{self, State};

/// The name recorded in the state file, or a helpful error when no profile
/// has been linked yet.
pub(crate) fn current_profile_name() -> Result<String> {
    let state = State::load_or_default()?;
    if state.current_profile.is_empty() {
        bail!("no profile is currently active, run `dfm link <profile>` first");
    }
    Ok(state.current_profile)
}

/// Load a profile by name from the profiles directory.
pub(crate) fn load_named_profile(name: &str) -> Result<Profile> {
    let dir = state::profile_dir(name);
    if !dir.is_dir() {
        bail!("no profile named '{name}' exists, try `dfm list`");
    }
    Profile::load(&dir).with_context(|| format!("loading profile '{name}'"))
}

/// Load the current profile.
pub(crate) fn current_profile() -> Result<Profile> {
    let name = current_profile_name()?;
    load_named_profile(&name)
}

/// Record `name` as the current profile.
pub(crate) fn set_current_profile(name: &str) -> Result<()> {
    let mut state = State::load_or_default()?;
    state.current_profile = name.to_string();
    state.save(&state::state_file())?;
    Ok(())
}
