//! Process-wide state and directory resolution.
//!
//! dfm keeps one JSON state file recording which profile is active, plus a
//! state directory holding downloaded profiles and cloned modules:
//!
//! ```text
//! $DFM_CONFIG_DIR (default $XDG_CONFIG_HOME/dfm, default ~/.config/dfm)
//! ├── state.json      {"current_profile": "<name>"}
//! ├── profiles/<name>
//! └── modules/<name>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Resolve the user's home directory.
///
/// `$HOME` wins so tests and scripts can redirect it; the platform lookup is
/// the fallback.
#[must_use]
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve `$XDG_CONFIG_HOME`, defaulting to `~/.config`.
#[must_use]
pub fn xdg_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// Resolve the dfm state directory.
#[must_use]
pub fn state_dir() -> PathBuf {
    std::env::var_os("DFM_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| xdg_config_dir().join("dfm"))
}

/// Directory holding profile working trees.
#[must_use]
pub fn profiles_dir() -> PathBuf {
    state_dir().join("profiles")
}

/// Directory holding cloned module working trees.
#[must_use]
pub fn modules_dir() -> PathBuf {
    state_dir().join("modules")
}

/// Location of a named profile.
#[must_use]
pub fn profile_dir(name: &str) -> PathBuf {
    profiles_dir().join(name)
}

/// Path to the state file.
#[must_use]
pub fn state_file() -> PathBuf {
    state_dir().join("state.json")
}

/// The persisted process-wide state.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct State {
    /// Name of the profile operated on by commands that take no profile
    /// argument. Empty when no profile has been linked yet.
    #[serde(default)]
    pub current_profile: String,
}

impl State {
    /// Load the state from `path`, returning the default state when the
    /// file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| StateError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the state from the default location.
    pub fn load_or_default() -> Result<Self, StateError> {
        Self::load(&state_file())
    }

    /// Write the state to `path`, creating parent directories on demand.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string(self).map_err(|source| StateError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(io_err)
    }
}
