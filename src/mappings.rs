//! Mapping rule engine.
//!
//! A [`Mapping`] translates a file path, relative to a profile root, into a
//! link decision: skip the file, link a whole subdirectory in one go, or
//! redirect the destination. A [`MappingSet`] evaluates rules in declared
//! order — user rules first, the built-in rules appended last — and the
//! first rule whose pattern matches *and* whose OS filter applies wins.
//! Rules are compiled once at profile-load time and never mutated.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

/// `target_os` accepts either a single OS name or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OsNames {
    /// A single OS name, e.g. `target_os: Linux`.
    One(String),
    /// Several OS names, e.g. `target_os: [Linux, Darwin]`.
    Many(Vec<String>),
}

impl OsNames {
    /// Normalised (lowercase, `darwin` folded into `macos`) list of names.
    fn normalised(&self) -> Vec<String> {
        let names = match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names.as_slice(),
        };
        names.iter().map(|name| canonical_os(name)).collect()
    }
}

/// Fold user-supplied OS names onto [`std::env::consts::OS`] values.
///
/// The historical config format used uname-style names (`Darwin`, `Linux`,
/// `Windows`), so matching is case-insensitive and `darwin` means `macos`.
fn canonical_os(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower == "darwin" {
        "macos".to_string()
    } else {
        lower
    }
}

/// One mapping rule as it appears in `.dfm.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingConfig {
    /// Regular expression matched against the relative file path.
    #[serde(rename = "match")]
    pub pattern: String,

    /// Skip matching files entirely.
    #[serde(default)]
    pub skip: bool,

    /// Explicit destination: absolute when it starts with a path separator,
    /// otherwise joined under the profile's target directory.
    #[serde(default)]
    pub dest: String,

    /// Replace the profile's target-directory prefix in the computed
    /// destination with this directory.
    #[serde(default)]
    pub target_dir: String,

    /// Treat `match` as a literal subdirectory of the profile and link it
    /// wholesale as a single directory symlink.
    #[serde(default)]
    pub link_as_dir: bool,

    /// Restrict the rule to these operating systems; absent means all.
    #[serde(default)]
    pub target_os: Option<OsNames>,
}

/// The effect a rule applies when it matches.
///
/// At most one effect is active per rule; when a config sets several, the
/// priority is skip > `link_as_dir` > dest > `target_dir`. `Rename` and
/// `IntoDir` are internal-only effects used by the built-in rules — user
/// configuration cannot name them.
#[derive(Debug, Clone)]
enum Effect {
    Skip,
    LinkAsDir,
    Dest(String),
    TargetDir(PathBuf),
    /// Replace the file name of the computed destination (depth-preserving
    /// rename, used for `.ggitignore` -> `.gitignore`).
    Rename(String),
    /// Drop the first path component and re-root the remainder under the
    /// given directory (used for `config/` -> `$XDG_CONFIG_HOME`).
    IntoDir(PathBuf),
    /// Matched, but leaves the default destination untouched.
    None,
}

/// A compiled mapping rule.
#[derive(Debug, Clone)]
pub struct Mapping {
    raw: String,
    rgx: Regex,
    target_os: Vec<String>,
    effect: Effect,
}

impl Mapping {
    /// Compile a user-declared rule.
    pub fn from_config(cfg: &MappingConfig) -> Result<Self, ConfigError> {
        let effect = if cfg.skip {
            Effect::Skip
        } else if cfg.link_as_dir {
            Effect::LinkAsDir
        } else if !cfg.dest.is_empty() {
            Effect::Dest(shellexpand::tilde(&cfg.dest).into_owned())
        } else if !cfg.target_dir.is_empty() {
            Effect::TargetDir(PathBuf::from(
                shellexpand::tilde(&cfg.target_dir).into_owned(),
            ))
        } else {
            Effect::None
        };

        Ok(Self {
            raw: cfg.pattern.clone(),
            rgx: compile(&cfg.pattern)?,
            target_os: cfg
                .target_os
                .as_ref()
                .map(OsNames::normalised)
                .unwrap_or_default(),
            effect,
        })
    }

    fn builtin(pattern: &str, effect: Effect) -> Result<Self, ConfigError> {
        Ok(Self {
            raw: pattern.to_string(),
            rgx: compile(pattern)?,
            target_os: Vec::new(),
            effect,
        })
    }

    /// Whether this rule matches the (slash-normalised) relative path.
    fn is_match(&self, rel: &str) -> bool {
        self.rgx.is_match(rel)
    }

    /// Whether this rule applies on the given OS. A rule with an OS filter
    /// that excludes `os` is inert: it falls through as if unmatched.
    fn applies_on(&self, os: &str) -> bool {
        self.target_os.is_empty() || self.target_os.iter().any(|name| name == os)
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Outcome of evaluating a path against a [`MappingSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Do not link this file.
    Skip,
    /// Link the named subdirectory (relative to the profile root) as one
    /// directory symlink instead of linking the file individually.
    LinkAsDir(PathBuf),
    /// Link the file to this destination.
    Redirect(PathBuf),
    /// No rule matched; the default transformation applies.
    Default,
}

/// An ordered, immutable set of mapping rules plus the directories needed
/// to compute destinations.
#[derive(Debug, Clone)]
pub struct MappingSet {
    mappings: Vec<Mapping>,
    target_dir: PathBuf,
    os: String,
}

impl MappingSet {
    /// Build a mapping set from user-declared rules.
    ///
    /// The built-in rules (skip repository metadata, rename `.ggitignore`,
    /// redirect `config/` into `xdg_dir`) are appended after the user rules
    /// and evaluated with the same first-match-wins precedence.
    pub fn new(
        user: &[MappingConfig],
        target_dir: PathBuf,
        xdg_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let mut mappings = user
            .iter()
            .map(Mapping::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        mappings.extend(builtin_mappings(xdg_dir)?);

        Ok(Self {
            mappings,
            target_dir,
            os: std::env::consts::OS.to_string(),
        })
    }

    /// The profile's default target directory.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Evaluate a relative path against the rule set.
    #[must_use]
    pub fn evaluate(&self, rel: &Path) -> Evaluation {
        let rel_str = slashed(rel);

        for mapping in &self.mappings {
            if !mapping.is_match(&rel_str) {
                continue;
            }
            // An OS-filtered rule that does not apply here is treated as
            // unmatched so an OS-agnostic rule later in the set can still
            // claim the path.
            if !mapping.applies_on(&self.os) {
                continue;
            }

            return match &mapping.effect {
                Effect::Skip => Evaluation::Skip,
                Effect::LinkAsDir => Evaluation::LinkAsDir(PathBuf::from(&mapping.raw)),
                Effect::Dest(dest) => Evaluation::Redirect(self.explicit_dest(dest)),
                Effect::TargetDir(dir) => Evaluation::Redirect(self.retarget(rel, dir)),
                Effect::Rename(name) => {
                    let mut dest = self.default_destination(rel);
                    dest.set_file_name(name);
                    Evaluation::Redirect(dest)
                }
                Effect::IntoDir(base) => match strip_first_component(rel) {
                    Some(rest) => Evaluation::Redirect(base.join(rest)),
                    None => Evaluation::Default,
                },
                Effect::None => Evaluation::Default,
            };
        }

        Evaluation::Default
    }

    /// The default transformation: a root-level name without a leading dot
    /// gets one, and the result is joined under the target directory.
    #[must_use]
    pub fn default_destination(&self, rel: &Path) -> PathBuf {
        self.target_dir.join(dotted(rel))
    }

    /// Check every `link_as_dir` rule against the profile root.
    ///
    /// Reported at load time, before any linking side effects occur.
    pub fn validate(&self, profile_root: &Path) -> Result<(), ConfigError> {
        for mapping in &self.mappings {
            if matches!(mapping.effect, Effect::LinkAsDir)
                && !profile_root.join(&mapping.raw).is_dir()
            {
                return Err(ConfigError::NotADirectory {
                    pattern: mapping.raw.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The always-present rules, appended after user rules.
fn builtin_mappings(xdg_dir: &Path) -> Result<Vec<Mapping>, ConfigError> {
    Ok(vec![
        Mapping::builtin(r"(^|/)\.git/", Effect::Skip)?,
        Mapping::builtin(r"(^|/)\.gitignore$", Effect::Skip)?,
        Mapping::builtin(
            r"(^|/)\.ggitignore$",
            Effect::Rename(".gitignore".to_string()),
        )?,
        Mapping::builtin(r"(^|/)LICENSE(\.md)?$", Effect::Skip)?,
        Mapping::builtin(r"(^|/)README(\.md|\.txt|\.rst|\.org)?$", Effect::Skip)?,
        Mapping::builtin(r"(^|/)\.dfm\.ya?ml$", Effect::Skip)?,
        Mapping::builtin(r"^\.?config/", Effect::IntoDir(xdg_dir.to_path_buf()))?,
    ])
}

/// Normalise a relative path to forward slashes for pattern matching, so
/// rules written with `/` work on every platform.
fn slashed(rel: &Path) -> String {
    let s = rel.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Dotfile-ize a relative path: a single-component name that does not
/// already start with `.` receives a leading dot; deeper paths pass through.
fn dotted(rel: &Path) -> PathBuf {
    let mut components = rel.components();
    let first = components.next();
    if components.next().is_some() {
        return rel.to_path_buf();
    }

    match first.map(|c| c.as_os_str().to_string_lossy().into_owned()) {
        Some(name) if !name.starts_with('.') => PathBuf::from(format!(".{name}")),
        _ => rel.to_path_buf(),
    }
}

fn strip_first_component(rel: &Path) -> Option<PathBuf> {
    let mut components = rel.components();
    components.next()?;
    let rest = components.as_path();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest.to_path_buf())
    }
}

impl MappingSet {
    /// Compute the destination an explicit `dest` value names.
    fn explicit_dest(&self, dest: &str) -> PathBuf {
        let path = Path::new(dest);
        if path.is_absolute() || dest.starts_with('/') {
            path.to_path_buf()
        } else {
            self.target_dir.join(path)
        }
    }

    /// Swap the target-directory prefix of the already-computed default
    /// destination for the rule's directory.
    fn retarget(&self, rel: &Path, new_target: &Path) -> PathBuf {
        let default = self.default_destination(rel);
        match default.strip_prefix(&self.target_dir) {
            Ok(rest) => new_target.join(rest),
            Err(_) => default,
        }
    }
}
