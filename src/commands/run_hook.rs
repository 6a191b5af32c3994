//! The `run-hook` subcommand.

use anyhow::Result;

use crate::cli::RunHookOpts;

/// Run a hook by name without invoking the command it normally wraps.
/// Works for the lifecycle names and for arbitrary user-defined hooks.
pub fn run(opts: &RunHookOpts) -> Result<()> {
    let profile = super::current_profile()?;
    profile.run_hook(&opts.hook)?;
    Ok(())
}
