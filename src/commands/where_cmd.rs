//! The `where` subcommand.

use anyhow::Result;

use crate::state;

/// Print the location of the current profile. Useful in scripts, e.g.
/// `cd $(dfm where)`.
pub fn run() -> Result<()> {
    let name = super::current_profile_name()?;
    println!("{}", state::profile_dir(&name).display());
    Ok(())
}
