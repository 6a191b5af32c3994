//! The `link` subcommand.

use anyhow::Result;

use crate::cli::LinkOpts;
use crate::profile::Profile;

/// Link a profile into place.
///
/// Naming a profile switches the current profile to it first — unless this
/// is a dry run, which must have no side effects at all, state file
/// included. Without a name the current profile is relinked.
pub fn run(opts: &LinkOpts) -> Result<()> {
    let profile = match &opts.profile {
        Some(name) => {
            let profile = super::load_named_profile(name)?;
            if !opts.dry_run {
                super::set_current_profile(name)?;
            }
            profile
        }
        None => super::current_profile()?,
    };

    let links = profile.link(opts.dry_run, opts.overwrite)?;
    if opts.dry_run {
        for link in &links {
            println!("{}", link.describe());
        }
    }
    Ok(())
}

/// Link an already-loaded profile and make it current. Shared with `clone
/// --link`.
pub(crate) fn activate(profile: &Profile, name: &str, overwrite: bool) -> Result<()> {
    super::set_current_profile(name)?;
    profile.link(false, overwrite)?;
    Ok(())
}
