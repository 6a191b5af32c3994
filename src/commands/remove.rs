//! The `remove` subcommand.

use std::io::{self, BufRead as _, Write as _};

use anyhow::{Result, bail};

use crate::cli::RemoveOpts;
use crate::state::{self, State};

/// Delete a profile from this machine after an interactive confirmation.
/// If the deleted profile was current, the state file is cleared too.
pub fn run(opts: &RemoveOpts) -> Result<()> {
    let dir = state::profile_dir(&opts.profile);
    if !dir.is_dir() {
        bail!("no profile named '{}' exists", opts.profile);
    }

    print!("remove {}? [Y/n]: ", dir.display());
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    if answer.trim().to_lowercase().starts_with('n') {
        return Ok(());
    }

    std::fs::remove_dir_all(&dir)?;

    let mut current = State::load_or_default()?;
    if current.current_profile == opts.profile {
        current.current_profile.clear();
        current.save(&state::state_file())?;
    }
    Ok(())
}
