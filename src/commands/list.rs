//! The `list` subcommand.

use anyhow::Result;

use crate::state;

/// Print the names of the profiles available on this machine.
pub fn run() -> Result<()> {
    let dir = state::profiles_dir();
    if !dir.is_dir() {
        println!("there are no profiles on this system yet, create one with `dfm init`");
        return Ok(());
    }

    let mut names: Vec<String> = std::fs::read_dir(&dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    for name in names {
        println!("{name}");
    }
    Ok(())
}
