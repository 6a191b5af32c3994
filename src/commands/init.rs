//! The `init` subcommand.

use anyhow::{Result, bail};

use crate::cli::InitOpts;
use crate::profile::Profile;
use crate::state;

/// Create a new, empty profile: a fresh directory under the profiles dir
/// with an initialised git repository. No network operation occurs.
pub fn run(opts: &InitOpts) -> Result<()> {
    let dir = state::profile_dir(&opts.name);
    if dir.exists() {
        bail!("a profile named '{}' already exists", opts.name);
    }

    Profile::create(&dir)?;
    println!("created profile at {}", dir.display());
    Ok(())
}
