//! The `git` passthrough subcommand.

use anyhow::Result;

use crate::cli::GitOpts;

/// Run an arbitrary git command in the current profile with stdio passed
/// through, so interactive subcommands behave exactly like plain git.
pub fn run(opts: &GitOpts) -> Result<()> {
    let profile = super::current_profile()?;
    let args: Vec<&str> = opts.args.iter().map(String::as_str).collect();
    profile.repo().git(&args)?;
    Ok(())
}
