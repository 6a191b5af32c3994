//! The `sync` subcommand.

use anyhow::{Result, bail};

use crate::cli::SyncOpts;
use crate::state;

/// Sync the current profile, or — with `--name` — a specific profile or
/// module. Module names are found by recursive search through the current
/// profile's tree.
pub fn run(opts: &SyncOpts) -> Result<()> {
    if let Some(name) = &opts.name {
        let dir = state::profile_dir(name);
        if dir.is_dir() {
            let profile = super::load_named_profile(name)?;
            profile.sync(opts.message.as_deref(), opts.dry_run, false)?;
            return Ok(());
        }

        let current = super::current_profile()?;
        let Some(module) = current.find_module(name) else {
            bail!("no module or profile matched name: {name}");
        };
        module.sync(opts.message.as_deref(), opts.dry_run, false)?;
        return Ok(());
    }

    let profile = super::current_profile()?;
    profile.sync(opts.message.as_deref(), opts.dry_run, false)?;
    Ok(())
}
