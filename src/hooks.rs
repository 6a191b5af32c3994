//! Lifecycle hooks.
//!
//! A profile's `.dfm.yml` can attach ordered lists of shell commands to
//! event names: `before_link`, `after_link`, `before_sync`, `after_sync`,
//! plus any user-defined name runnable with `dfm run-hook`. Each entry is
//! either a bare command string (run through `/bin/sh -c`) or an
//! `{interpreter, script}` pair. Hooks run with the profile directory as
//! the working directory and stdio inherited, so they can be interactive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::HookError;
use crate::exec;

/// One hook entry: a plain command string or an explicit interpreter pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HookCommand {
    /// Plain string: `"echo hello"` — run through the default interpreter.
    Command(String),
    /// Structured: `{interpreter: "python3 -c", script: "print('hi')"}`.
    Script {
        /// Interpreter command line, split on whitespace.
        #[serde(default = "default_interpreter")]
        interpreter: String,
        /// The script text passed as the interpreter's final argument.
        #[serde(default)]
        script: String,
    },
}

fn default_interpreter() -> String {
    "/bin/sh -c".to_string()
}

/// Map of event name to ordered hook commands, as parsed from `.dfm.yml`.
pub type HookConfig = BTreeMap<String, Vec<HookCommand>>;

/// Executes the hooks of one profile.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    dir: PathBuf,
    hooks: HookConfig,
}

impl Hooks {
    /// Create a hook runner for the profile at `dir`.
    #[must_use]
    pub fn new(dir: PathBuf, hooks: HookConfig) -> Self {
        Self { dir, hooks }
    }

    /// Whether any commands are attached to `name`.
    #[must_use]
    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks.get(name).is_some_and(|cmds| !cmds.is_empty())
    }

    /// Run every command attached to `name`, in declared order.
    ///
    /// In dry-run mode the commands are logged but not executed. A command
    /// that exits non-zero produces a warning and the remaining commands
    /// still run; a command that cannot be spawned at all is an error.
    pub fn run(&self, name: &str, dry_run: bool) -> Result<(), HookError> {
        let Some(commands) = self.hooks.get(name) else {
            debug!("no {name} hooks configured");
            return Ok(());
        };

        for command in commands {
            let (interpreter, script) = match command {
                HookCommand::Command(script) => (default_interpreter(), script.clone()),
                HookCommand::Script {
                    interpreter,
                    script,
                } => (interpreter.clone(), script.clone()),
            };

            if script.is_empty() {
                warn!("found an empty script for hook {name}, skipping");
                continue;
            }

            let mut argv: Vec<&str> = interpreter.split_whitespace().collect();
            let Some(program) = argv.first().copied() else {
                warn!("found an empty interpreter for hook {name}, skipping");
                continue;
            };
            argv.remove(0);
            argv.push(&script);

            if dry_run {
                info!(
                    "would run {name} hook: {}",
                    exec::display_command(program, &argv)
                );
                continue;
            }

            debug!("running {name} hook: {}", exec::display_command(program, &argv));
            match exec::run_interactive(&self.dir, program, &argv) {
                Ok(0) => {}
                Ok(code) => {
                    warn!("{name} hook command exited with status {code}");
                }
                Err(source) => {
                    return Err(HookError::Spawn {
                        name: name.to_string(),
                        command: exec::display_command(program, &argv),
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Convenience constructor used by tests and the profile loader.
impl Hooks {
    /// Hook runner for `dir` with no hooks configured.
    #[must_use]
    pub fn empty(dir: &Path) -> Self {
        Self::new(dir.to_path_buf(), HookConfig::new())
    }
}
