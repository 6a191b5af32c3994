//! Dotfile profiles and module composition.
//!
//! A [`Profile`] is the aggregate root: one git working tree of dotfiles
//! plus an ordered list of child modules, each itself a full profile.
//! The profile holds three independent collaborators — the git binding,
//! the link manager, and the hook runner — and orchestrates linking and
//! syncing order across itself and its modules. Everything is assembled
//! here, at load time, from explicit configuration; there is no shared
//! mutable state between profile instances and every load re-reads the
//! configuration from disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{LinkMode, ModuleConfig, ProfileConfig};
use crate::error::{ConfigError, DfmError};
use crate::hooks::Hooks;
use crate::links::{Link, LinkManager};
use crate::mappings::MappingSet;
use crate::repo::DotfileRepo;
use crate::state;

/// Module nesting limit. True cycles cannot occur by construction (modules
/// are declared by URL, not by reference), so this only guards runaway
/// self-referential clones.
const MAX_MODULE_DEPTH: usize = 8;

/// Derive a profile name from a git URL.
///
/// For ssh-style URLs (`git@host:group/repo`) the name is the first path
/// segment after the colon; otherwise it is the second-to-last
/// slash-delimited segment. Both forms yield `group` for
/// `.../chasinglogic/dotfiles`. Anything unparseable yields an empty
/// string, which callers treat as "name undetermined".
#[must_use]
pub fn get_name(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    if url.contains('@') {
        return url
            .split(':')
            .next_back()
            .unwrap_or("")
            .split('/')
            .next()
            .unwrap_or("")
            .to_string();
    }

    url.rsplit('/').nth(1).unwrap_or("").to_string()
}

/// A dotfile profile: one repository, its mapping rules, hooks, and child
/// modules.
#[derive(Debug)]
pub struct Profile {
    name: String,
    location: PathBuf,
    link_mode: LinkMode,
    pull_only: bool,
    modules: Vec<Profile>,

    repo: DotfileRepo,
    link_manager: LinkManager,
    hooks: Hooks,
}

impl Profile {
    /// Load the profile rooted at `dir`, recursively loading (and cloning,
    /// when absent from disk) its modules.
    pub fn load(dir: &Path) -> Result<Self, DfmError> {
        Self::load_with(dir, None, 0)
    }

    /// Create and initialise a brand-new profile at `dir`: make the
    /// directory, apply the default configuration, run `git init`. No
    /// network operation occurs.
    pub fn create(dir: &Path) -> Result<Self, DfmError> {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let profile = Self::load(dir)?;
        profile.repo.init()?;
        Ok(profile)
    }

    fn load_with(
        dir: &Path,
        overrides: Option<&ModuleConfig>,
        depth: usize,
    ) -> Result<Self, DfmError> {
        if depth > MAX_MODULE_DEPTH {
            return Err(ConfigError::ModuleDepthExceeded {
                limit: MAX_MODULE_DEPTH,
                location: dir.to_path_buf(),
            }
            .into());
        }

        let location = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let config = ProfileConfig::load(&location)?;

        // A module entry's keys override the module's own .dfm.yml.
        let link_mode = overrides
            .and_then(|o| o.link)
            .or(config.link)
            .unwrap_or_default();
        let pull_only = overrides
            .and_then(|o| o.pull_only)
            .unwrap_or(config.pull_only);
        let branch = overrides
            .and_then(|o| o.branch.clone())
            .or_else(|| config.branch.clone())
            .unwrap_or_else(|| "master".to_string());

        let target_dir = match &config.target_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => state::home_dir(),
        };
        let commit_msg = config
            .commit_msg
            .clone()
            .or_else(|| std::env::var("DFM_COMMIT_MSG").ok())
            .unwrap_or_default();

        let mappings = MappingSet::new(&config.mappings, target_dir, &state::xdg_config_dir())?;
        mappings.validate(&location)?;

        let repo = DotfileRepo::new(
            location.clone(),
            branch,
            commit_msg,
            config.prompt_for_commit_message,
        );
        let link_manager = LinkManager::new(location.clone(), mappings);
        let hooks = Hooks::new(location.clone(), config.hooks.clone());

        let name = overrides
            .and_then(|o| o.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                overrides
                    .and_then(ModuleConfig::url)
                    .map(get_name)
                    .filter(|name| !name.is_empty())
            })
            .or_else(|| repo.remote_url().map(|url| get_name(&url)))
            .unwrap_or_default();

        let mut modules = Vec::with_capacity(config.modules.len());
        for module in &config.modules {
            modules.push(Self::load_module(module, depth + 1)?);
        }

        debug!(
            "loaded {} {} at {}",
            if depth == 0 { "profile" } else { "module" },
            if name.is_empty() { "<unnamed>" } else { name.as_str() },
            location.display()
        );

        Ok(Self {
            name,
            location,
            link_mode,
            pull_only,
            modules,
            repo,
            link_manager,
            hooks,
        })
    }

    /// Resolve one module declaration: work out its name and location, and
    /// clone it when the location does not exist yet. The module's own
    /// `.dfm.yml` lives inside the cloned tree, so cloning must happen
    /// before the recursive load. Cloning can be disabled globally with
    /// `DFM_DISABLE_MODULES` for offline or test use.
    fn load_module(config: &ModuleConfig, depth: usize) -> Result<Self, DfmError> {
        let url = config.url().map(str::to_string).unwrap_or_default();
        let name = config
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| Some(get_name(&url)).filter(|name| !name.is_empty()))
            .ok_or_else(|| ConfigError::ModuleWithoutRepo {
                name: "?".to_string(),
            })?;

        let location = match &config.location {
            Some(location) => PathBuf::from(shellexpand::tilde(location).into_owned()),
            None => state::modules_dir().join(&name),
        };

        if !location.is_dir() && std::env::var_os("DFM_DISABLE_MODULES").is_none() {
            if url.is_empty() {
                return Err(ConfigError::ModuleWithoutRepo { name }.into());
            }
            if let Some(parent) = location.parent() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            info!("cloning module {name} into {}", location.display());
            DotfileRepo::clone_from(&url, &location, config.branch.as_deref())?;
        }

        Self::load_with(&location, Some(config), depth)
    }

    /// The profile's name (may be empty when underivable).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The profile's working tree location.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// When this profile links relative to its parent. Meaningless for a
    /// root profile's own linking, which only checks for `none`.
    #[must_use]
    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    /// Child modules in declaration order.
    #[must_use]
    pub fn modules(&self) -> &[Profile] {
        &self.modules
    }

    /// The git collaborator, for passthrough commands.
    #[must_use]
    pub fn repo(&self) -> &DotfileRepo {
        &self.repo
    }

    /// The link manager, for dead-link scanning.
    #[must_use]
    pub fn link_manager(&self) -> &LinkManager {
        &self.link_manager
    }

    /// Link this profile and its modules into their target directories.
    ///
    /// Order: `before_link` hook, modules declared `link: pre`, this
    /// profile's own files (unless its own link mode is `none`), modules
    /// declared `link: post`, `after_link` hook. Modules declared
    /// `link: none` take part in neither phase.
    ///
    /// Returns the links computed for this profile and all linked modules.
    pub fn link(&self, dry_run: bool, overwrite: bool) -> Result<Vec<Link>, DfmError> {
        let mut links = Vec::new();
        self.hooks.run("before_link", dry_run)?;

        for module in self.modules_linked(LinkMode::Pre) {
            debug!("linking module {}", module.location.display());
            links.extend(module.link(dry_run, overwrite)?);
        }

        if self.link_mode != LinkMode::None {
            let files = self.repo.tracked_files()?;
            links.extend(self.link_manager.link(&files, dry_run, overwrite)?);
        }

        for module in self.modules_linked(LinkMode::Post) {
            debug!("linking module {}", module.location.display());
            links.extend(module.link(dry_run, overwrite)?);
        }

        self.hooks.run("after_link", dry_run)?;
        Ok(links)
    }

    fn modules_linked(&self, mode: LinkMode) -> impl Iterator<Item = &Profile> {
        self.modules
            .iter()
            .filter(move |module| module.link_mode == mode)
    }

    /// Sync this profile with git, then every module depth-first in
    /// declaration order (unless `skip_modules`).
    ///
    /// A `pull_only` profile only rebase-pulls; everything else runs the
    /// full commit/pull/push protocol.
    pub fn sync(
        &self,
        commit_msg: Option<&str>,
        dry_run: bool,
        skip_modules: bool,
    ) -> Result<(), DfmError> {
        self.hooks.run("before_sync", dry_run)?;
        if self.pull_only {
            self.repo.pull(dry_run)?;
        } else {
            self.repo.sync(commit_msg, dry_run)?;
        }
        self.hooks.run("after_sync", dry_run)?;

        if !skip_modules {
            for module in &self.modules {
                module.sync(None, dry_run, false)?;
            }
        }

        Ok(())
    }

    /// Run a named hook on its own, without the surrounding command.
    pub fn run_hook(&self, name: &str) -> Result<(), DfmError> {
        self.hooks.run(name, false)?;
        Ok(())
    }

    /// Depth-first search for a module by name.
    #[must_use]
    pub fn find_module(&self, name: &str) -> Option<&Profile> {
        for module in &self.modules {
            if module.name == name {
                return Some(module);
            }
            if let Some(found) = module.find_module(name) {
                return Some(found);
            }
        }
        None
    }
}
