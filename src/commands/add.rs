//! The `add` subcommand.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use crate::cli::AddOpts;

/// Move files into the current profile, doing reverse dotfile-ization on
/// their names, then sync (modules skipped) and relink so each moved file
/// immediately becomes a symlink back into the profile.
pub fn run(opts: &AddOpts) -> Result<()> {
    let profile = super::current_profile()?;
    let keep_dot = opts.keep_dot || std::env::var_os("DFM_KEEP_DOT").is_some();

    for file in &opts.files {
        let source = dunce::canonicalize(file)
            .with_context(|| format!("{}: file does not exist", file.display()))?;
        let Some(name) = source.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            bail!("{}: cannot add a filesystem root", source.display());
        };

        let stored = if keep_dot {
            name.clone()
        } else {
            name.strip_prefix('.').unwrap_or(&name).to_string()
        };
        let dest = profile.location().join(stored);

        if source.is_dir() {
            copy_dir_recursive(&source, &dest)?;
            fs::remove_dir_all(&source)
                .with_context(|| format!("removing {}", source.display()))?;
        } else {
            fs::copy(&source, &dest).with_context(|| {
                format!("copying {} to {}", source.display(), dest.display())
            })?;
            fs::remove_file(&source)
                .with_context(|| format!("removing {}", source.display()))?;
        }
    }

    profile.sync(None, false, true)?;
    profile.link(false, false)?;
    Ok(())
}

/// Recursively copy a directory tree, following symlinks inside it.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        fs::create_dir(src.path().join("sub")).unwrap();
        fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
    }
}
