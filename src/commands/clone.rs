//! The `clone` subcommand.

use anyhow::{Result, bail};

use crate::cli::CloneOpts;
use crate::profile::Profile;
use crate::repo::DotfileRepo;
use crate::state;

/// Clone an existing dotfile repository into a new profile.
///
/// The default profile name is the last path segment of the URL (so
/// `https://github.com/chasinglogic/dotfiles` becomes `dotfiles`); loading
/// the profile afterwards pulls in any modules it declares. With `--link`
/// the new profile becomes current and is linked immediately.
pub fn run(opts: &CloneOpts) -> Result<()> {
    let name = match &opts.name {
        Some(name) => name.clone(),
        None => default_name(&opts.url),
    };
    if name.is_empty() {
        bail!("cannot derive a profile name from '{}', use --name", opts.url);
    }

    let dir = state::profile_dir(&name);
    if dir.exists() {
        bail!("a profile named '{name}' already exists at {}", dir.display());
    }

    DotfileRepo::clone_from(&opts.url, &dir, None)?;
    let profile = Profile::load(&dir)?;

    if opts.link {
        super::link::activate(&profile, &name, opts.overwrite)?;
    }
    Ok(())
}

/// The last path segment of the URL, with any `.git` suffix dropped.
fn default_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim_end_matches(".git")
        .to_string()
}
