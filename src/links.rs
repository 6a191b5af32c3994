//! Symlink generation and application.
//!
//! The [`LinkManager`] turns the list of files tracked by a profile's git
//! repository into a concrete set of [`Link`]s (consulting the mapping
//! engine for every path) and applies them to the filesystem. Application
//! is idempotent: stale symlinks are replaced unconditionally, while real
//! files and directories are only ever removed when the caller passes
//! `overwrite` — otherwise the link is skipped with a warning and the run
//! continues so the user sees every conflict in one pass.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::mappings::{Evaluation, MappingSet};

/// A single symlink to create: `dst` will point at `src`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Link {
    /// Absolute path of the file or directory inside the profile.
    pub src: PathBuf,
    /// Absolute path the symlink is created at.
    pub dst: PathBuf,
    /// Whether `dst` is a directory symlink (relevant on Windows).
    pub directory: bool,
}

impl Link {
    /// Render as `dst -> src` for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.dst.display(), self.src.display())
    }
}

/// Computes and applies the symlinks for one profile directory.
#[derive(Debug, Clone)]
pub struct LinkManager {
    root: PathBuf,
    mappings: MappingSet,
}

impl LinkManager {
    /// Create a manager for the profile rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf, mappings: MappingSet) -> Self {
        Self { root, mappings }
    }

    /// The profile directory this manager links from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the link set for the given tracked files (paths relative to
    /// the profile root).
    ///
    /// Duplicate `(src, dst)` pairs — possible when a `link_as_dir` rule
    /// matches several files in the same subdirectory — are deduplicated.
    #[must_use]
    pub fn generate_links(&self, files: &[PathBuf]) -> Vec<Link> {
        let mut links = BTreeSet::new();

        for rel in files {
            let link = match self.mappings.evaluate(rel) {
                Evaluation::Skip => {
                    debug!("skipping {} (mapping)", rel.display());
                    continue;
                }
                Evaluation::LinkAsDir(dir) => Link {
                    src: self.root.join(&dir),
                    dst: self.mappings.default_destination(&dir),
                    directory: true,
                },
                Evaluation::Redirect(dst) => Link {
                    src: self.root.join(rel),
                    dst,
                    directory: false,
                },
                Evaluation::Default => Link {
                    src: self.root.join(rel),
                    dst: self.mappings.default_destination(rel),
                    directory: false,
                },
            };
            links.insert(link);
        }

        links.into_iter().collect()
    }

    /// Generate and apply links for the given tracked files.
    ///
    /// Returns the computed link set so callers can display it. In dry-run
    /// mode nothing on the filesystem is touched.
    pub fn link(
        &self,
        files: &[PathBuf],
        dry_run: bool,
        overwrite: bool,
    ) -> Result<Vec<Link>, LinkError> {
        let links = self.generate_links(files);
        for link in &links {
            apply_link(link, dry_run, overwrite)?;
        }
        Ok(links)
    }
}

/// What currently occupies a link destination.
enum Occupant {
    Nothing,
    Symlink,
    File,
    Directory,
}

fn occupant(path: &Path) -> Occupant {
    match fs::symlink_metadata(path) {
        Err(_) => Occupant::Nothing,
        Ok(meta) if meta.is_symlink() => Occupant::Symlink,
        Ok(meta) if meta.is_dir() => Occupant::Directory,
        Ok(_) => Occupant::File,
    }
}

/// Apply one link following the fixed decision ladder:
///
/// 1. an existing symlink at the destination is removed unconditionally,
/// 2. a missing destination needs no removal,
/// 3. a real file or directory is only removed with `overwrite`; otherwise
///    the link is skipped with a warning and the pass continues,
/// 4. missing parent directories are created,
/// 5. the symlink is created.
fn apply_link(link: &Link, dry_run: bool, overwrite: bool) -> Result<(), LinkError> {
    if !link.src.exists() {
        // Staged deletions still show up in the tracked file list; never
        // point a symlink at a missing source.
        debug!("source missing, skipping: {}", link.src.display());
        return Ok(());
    }

    match occupant(&link.dst) {
        Occupant::Nothing => {}
        Occupant::Symlink => {
            if !dry_run {
                remove_symlink(&link.dst)?;
            }
        }
        Occupant::File | Occupant::Directory if !overwrite => {
            warn!(
                "{} exists and is not a symlink, refusing to remove",
                link.dst.display()
            );
            return Ok(());
        }
        Occupant::File => {
            if !dry_run {
                fs::remove_file(&link.dst).map_err(|source| LinkError::Remove {
                    path: link.dst.clone(),
                    source,
                })?;
            }
        }
        Occupant::Directory => {
            if !dry_run {
                fs::remove_dir_all(&link.dst).map_err(|source| LinkError::Remove {
                    path: link.dst.clone(),
                    source,
                })?;
            }
        }
    }

    info!("linking {}", link.describe());
    if dry_run {
        return Ok(());
    }

    if let Some(parent) = link.dst.parent() {
        fs::create_dir_all(parent).map_err(|source| LinkError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    create_symlink(link).map_err(|source| LinkError::Create {
        src: link.src.clone(),
        dst: link.dst.clone(),
        source,
    })
}

/// Remove a symlink, handling the Windows directory-symlink quirk.
fn remove_symlink(path: &Path) -> Result<(), LinkError> {
    remove_symlink_impl(path).map_err(|source| LinkError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(windows))]
fn remove_symlink_impl(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

/// Directory symlinks on Windows must go through `remove_dir`.
#[cfg(windows)]
fn remove_symlink_impl(path: &Path) -> std::io::Result<()> {
    if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn create_symlink(link: &Link) -> std::io::Result<()> {
    std::os::unix::fs::symlink(&link.src, &link.dst)
}

#[cfg(windows)]
fn create_symlink(link: &Link) -> std::io::Result<()> {
    if link.directory {
        std::os::windows::fs::symlink_dir(&link.src, &link.dst)
    } else {
        std::os::windows::fs::symlink_file(&link.src, &link.dst)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mappings::MappingConfig;

    struct Fixture {
        _tmp: tempfile::TempDir,
        profile: PathBuf,
        target: PathBuf,
        xdg: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join("profile");
        let target = tmp.path().join("home");
        let xdg = tmp.path().join("xdg");
        fs::create_dir_all(&profile).unwrap();
        fs::create_dir_all(&target).unwrap();
        Fixture {
            _tmp: tmp,
            profile,
            target,
            xdg,
        }
    }

    fn manager(fx: &Fixture, user: &[MappingConfig]) -> LinkManager {
        let mappings = MappingSet::new(user, fx.target.clone(), &fx.xdg).unwrap();
        LinkManager::new(fx.profile.clone(), mappings)
    }

    fn write(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, rel).unwrap();
        path
    }

    fn rels(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn generates_dotfile_ized_links() {
        let fx = fixture();
        write(&fx.profile, "vimrc");
        write(&fx.profile, ".bashrc");
        let lm = manager(&fx, &[]);

        let links = lm.generate_links(&rels(&["vimrc", ".bashrc"]));
        let dsts: Vec<_> = links.iter().map(|l| l.dst.clone()).collect();
        assert!(dsts.contains(&fx.target.join(".vimrc")));
        assert!(dsts.contains(&fx.target.join(".bashrc")));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn skips_repository_metadata() {
        let fx = fixture();
        let lm = manager(&fx, &[]);
        let links = lm.generate_links(&rels(&["README.md", "LICENSE", ".dfm.yml", ".gitignore"]));
        assert!(links.is_empty());
    }

    #[test]
    fn link_as_dir_collapses_to_one_directory_link() {
        let fx = fixture();
        write(&fx.profile, "emacs.d/init.el");
        write(&fx.profile, "emacs.d/lisp/extra.el");
        let user = [serde_yaml::from_str("match: emacs.d\nlink_as_dir: true").unwrap()];
        let lm = manager(&fx, &user);

        let links = lm.generate_links(&rels(&["emacs.d/init.el", "emacs.d/lisp/extra.el"]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].src, fx.profile.join("emacs.d"));
        assert_eq!(links[0].dst, fx.target.join(".emacs.d"));
        assert!(links[0].directory);
    }

    #[cfg(unix)]
    #[test]
    fn applies_links_and_creates_parents() {
        let fx = fixture();
        write(&fx.profile, "bin/tool");
        let lm = manager(&fx, &[]);

        lm.link(&rels(&["bin/tool"]), false, false).unwrap();

        let dst = fx.target.join("bin/tool");
        assert!(dst.symlink_metadata().unwrap().is_symlink());
        assert_eq!(fs::read_link(&dst).unwrap(), fx.profile.join("bin/tool"));
    }

    #[cfg(unix)]
    #[test]
    fn linking_twice_is_idempotent() {
        let fx = fixture();
        write(&fx.profile, "vimrc");
        let lm = manager(&fx, &[]);
        let files = rels(&["vimrc"]);

        let first = lm.link(&files, false, false).unwrap();
        let second = lm.link(&files, false, false).unwrap();
        assert_eq!(first, second);

        let dst = fx.target.join(".vimrc");
        assert_eq!(fs::read_link(&dst).unwrap(), fx.profile.join("vimrc"));
    }

    #[cfg(unix)]
    #[test]
    fn refuses_to_overwrite_real_files_without_flag() {
        let fx = fixture();
        write(&fx.profile, "vimrc");
        let existing = fx.target.join(".vimrc");
        fs::write(&existing, "precious user data").unwrap();
        let lm = manager(&fx, &[]);

        // Not an error: the conflicting link is skipped and the run continues.
        lm.link(&rels(&["vimrc"]), false, false).unwrap();
        assert!(!existing.symlink_metadata().unwrap().is_symlink());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "precious user data");

        // With overwrite the file is replaced by a symlink.
        lm.link(&rels(&["vimrc"]), false, true).unwrap();
        assert!(existing.symlink_metadata().unwrap().is_symlink());
        assert_eq!(fs::read_link(&existing).unwrap(), fx.profile.join("vimrc"));
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_replaces_real_directories() {
        let fx = fixture();
        write(&fx.profile, "emacs.d/init.el");
        let user = [serde_yaml::from_str("match: emacs.d\nlink_as_dir: true").unwrap()];
        let lm = manager(&fx, &user);

        let existing = fx.target.join(".emacs.d");
        fs::create_dir_all(existing.join("old")).unwrap();

        lm.link(&rels(&["emacs.d/init.el"]), false, true).unwrap();
        assert!(existing.symlink_metadata().unwrap().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn dry_run_never_touches_the_filesystem() {
        let fx = fixture();
        write(&fx.profile, "vimrc");
        let lm = manager(&fx, &[]);

        // A stale symlink must survive a dry run untouched.
        let stale = fx.target.join(".vimrc");
        std::os::unix::fs::symlink(fx.profile.join("gone"), &stale).unwrap();

        let links = lm.link(&rels(&["vimrc"]), true, false).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(fs::read_link(&stale).unwrap(), fx.profile.join("gone"));
    }

    #[test]
    fn missing_sources_are_skipped() {
        let fx = fixture();
        let lm = manager(&fx, &[]);
        // Tracked but deleted from the working tree.
        lm.link(&rels(&["deleted-file"]), false, false).unwrap();
        assert!(fx.target.join(".deleted-file").symlink_metadata().is_err());
    }

    #[test]
    fn xdg_config_files_redirect() {
        let fx = fixture();
        write(&fx.profile, ".config/nvim/init.vim");
        let lm = manager(&fx, &[]);

        let links = lm.generate_links(&rels(&[".config/nvim/init.vim"]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].dst, fx.xdg.join("nvim/init.vim"));
    }
}
