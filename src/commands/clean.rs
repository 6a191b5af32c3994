//! The `clean` subcommand.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::state;

/// Remove dead symlinks left behind after files were deleted from the
/// current profile. Scans `$HOME` and the XDG config directory; only links
/// that point into the profile's own tree are ever touched.
pub fn run() -> Result<()> {
    let profile = super::current_profile()?;
    let profile_dir = profile.link_manager().root().to_path_buf();

    let removed = clean_links(&state::home_dir(), &profile_dir)
        + clean_links(&state::xdg_config_dir(), &profile_dir);
    info!("removed {removed} dead links");
    Ok(())
}

/// Walk `directory` and remove every broken symlink whose target lies
/// inside `profile_dir`. Unreadable entries are skipped, not fatal.
pub(crate) fn clean_links(directory: &Path, profile_dir: &Path) -> u32 {
    let mut removed = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.path_is_symlink() {
            continue;
        }

        let Ok(target) = fs::read_link(entry.path()) else {
            continue;
        };
        if !target.starts_with(profile_dir) {
            debug!("skipping non-profile link: {}", entry.path().display());
            continue;
        }
        if target.exists() {
            continue;
        }

        info!("removing dead link: {}", entry.path().display());
        if fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }

    removed
}
