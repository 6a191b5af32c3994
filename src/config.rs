//! The `.dfm.yml` data model.
//!
//! Every profile directory may carry a `.dfm.yml` (or `.dfm.yaml`) file; a
//! missing or empty file means the default configuration. Parsing is pure
//! deserialization into explicit structs with named fields — recognised
//! keys are typed, unknown keys are collected and warned about rather than
//! silently absorbed, and the one deprecated key gets a dedicated warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::hooks::HookConfig;
use crate::mappings::MappingConfig;

/// Config file names probed in order.
const CONFIG_FILE_NAMES: [&str; 2] = [".dfm.yml", ".dfm.yaml"];

/// Keys that are accepted but ignored, with a warning.
const DEPRECATED_KEYS: [&str; 1] = ["always_sync_modules"];

/// When a module is linked relative to its parent profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Linked before the parent profile's own files.
    Pre,
    /// Linked after the parent profile's own files, so its links win.
    #[default]
    Post,
    /// Never linked (useful for pull-only tooling repositories).
    None,
}

/// A module declaration inside a parent profile's `.dfm.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleConfig {
    /// Remote repository URL.
    #[serde(default)]
    pub repo: Option<String>,

    /// Accepted alias for `repo`.
    #[serde(default)]
    pub repository: Option<String>,

    /// Explicit module name; derived from the URL when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Explicit on-disk location (tilde-expanded); defaults to
    /// `<state-dir>/modules/<name>`.
    #[serde(default)]
    pub location: Option<String>,

    /// Sync never pushes for this module.
    #[serde(default)]
    pub pull_only: Option<bool>,

    /// Link ordering relative to the parent profile.
    #[serde(default)]
    pub link: Option<LinkMode>,

    /// Git branch to clone and sync.
    #[serde(default)]
    pub branch: Option<String>,
}

impl ModuleConfig {
    /// The declared URL, honouring the `repository` alias.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.repo.as_deref().or(self.repository.as_deref())
    }
}

/// The parsed contents of one `.dfm.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileConfig {
    /// Directory links are created under; defaults to `$HOME`.
    #[serde(default)]
    pub target_dir: Option<String>,

    /// Fixed commit message for sync.
    #[serde(default)]
    pub commit_msg: Option<String>,

    /// Ask for a commit message interactively when syncing dirty trees.
    #[serde(default)]
    pub prompt_for_commit_message: bool,

    /// Lifecycle hooks by event name.
    #[serde(default)]
    pub hooks: HookConfig,

    /// User-declared mapping rules, evaluated before the built-ins.
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,

    /// Child modules, in link/sync declaration order.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,

    /// Sync never pushes.
    #[serde(default)]
    pub pull_only: bool,

    /// Link ordering relative to a parent profile; `post` when absent.
    #[serde(default)]
    pub link: Option<LinkMode>,

    /// Git branch to sync against; `master` when absent.
    #[serde(default)]
    pub branch: Option<String>,

    /// Anything we do not recognise, kept so loading can warn about it.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_yaml::Value>,
}

impl ProfileConfig {
    /// Load the configuration for the profile directory `dir`.
    ///
    /// Returns the default configuration when no config file exists or the
    /// file is empty. Malformed YAML is an error, reported before any
    /// linking or syncing side effect. Deprecated and unknown keys warn but
    /// never fail loading.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let Some(path) = CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
        else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        // An empty or comment-only file parses to null; both mean defaults.
        let value: serde_yaml::Value =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?;
        if value.is_null() {
            return Ok(Self::default());
        }

        let mut config: Self =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?;

        for key in DEPRECATED_KEYS {
            if config.unknown.remove(key).is_some() {
                warn!("the config option {key} has been deprecated, ignoring");
            }
        }
        for key in config.unknown.keys() {
            warn!("unrecognised config option {key} in {}, ignoring", path.display());
        }

        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".dfm.yml"), contents).unwrap();
        let path = dir.path().to_path_buf();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProfileConfig::load(dir.path()).unwrap();
        assert!(config.target_dir.is_none());
        assert!(config.modules.is_empty());
        assert!(config.mappings.is_empty());
        assert!(!config.pull_only);
        assert_eq!(config.link.unwrap_or_default(), LinkMode::Post);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let (_dir, path) = write_config("");
        let config = ProfileConfig::load(&path).unwrap();
        assert!(config.modules.is_empty());
    }

    #[test]
    fn comment_only_file_yields_defaults() {
        let (_dir, path) = write_config("# nothing to see here\n");
        let config = ProfileConfig::load(&path).unwrap();
        assert!(config.modules.is_empty());
    }

    #[test]
    fn dfm_yaml_is_probed_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".dfm.yaml"), "pull_only: true\n").unwrap();
        let config = ProfileConfig::load(dir.path()).unwrap();
        assert!(config.pull_only);
    }

    #[test]
    fn parses_a_full_config() {
        let (_dir, path) = write_config(
            r"
target_dir: /tmp/elsewhere
commit_msg: managed
prompt_for_commit_message: true
branch: main
link: pre
pull_only: true
hooks:
  before_link:
    - echo hi
mappings:
  - match: bashrc
    skip: true
modules:
  - repo: https://example.com/team/extras
    link: none
  - repository: git@example.com:team/more
    name: more
    location: ~/more
    pull_only: true
    branch: develop
",
        );
        let config = ProfileConfig::load(&path).unwrap();
        assert_eq!(config.target_dir.as_deref(), Some("/tmp/elsewhere"));
        assert_eq!(config.commit_msg.as_deref(), Some("managed"));
        assert!(config.prompt_for_commit_message);
        assert_eq!(config.branch.as_deref(), Some("main"));
        assert_eq!(config.link, Some(LinkMode::Pre));
        assert!(config.pull_only);
        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.modules.len(), 2);
        assert_eq!(
            config.modules[0].url(),
            Some("https://example.com/team/extras")
        );
        assert_eq!(config.modules[0].link, Some(LinkMode::None));
        assert_eq!(config.modules[1].url(), Some("git@example.com:team/more"));
        assert_eq!(config.modules[1].branch.as_deref(), Some("develop"));
    }

    #[test]
    fn deprecated_keys_warn_but_load() {
        let (_dir, path) = write_config("always_sync_modules: true\npull_only: true\n");
        let config = ProfileConfig::load(&path).unwrap();
        assert!(config.pull_only);
        assert!(!config.unknown.contains_key("always_sync_modules"));
    }

    #[test]
    fn unknown_keys_warn_but_load() {
        let (_dir, path) = write_config("totally_made_up: 12\n");
        let config = ProfileConfig::load(&path).unwrap();
        assert!(config.unknown.contains_key("totally_made_up"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let (_dir, path) = write_config("mappings: [unclosed\n");
        assert!(matches!(
            ProfileConfig::load(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
