//! Command-line interface definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dfm",
    about = "A dotfile manager for pair programmers and lazy people",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print one line per action taken
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print debug-level diagnostics
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add files to the current dotfile profile
    #[command(visible_alias = "a")]
    Add(AddOpts),

    /// Remove dead symlinks pointing into the current profile
    #[command(visible_alias = "x")]
    Clean,

    /// Clone an existing profile with git
    #[command(visible_alias = "c")]
    Clone(CloneOpts),

    /// Run a git command in the current profile
    #[command(visible_alias = "g")]
    Git(GitOpts),

    /// Create a new, empty profile
    #[command(visible_alias = "i")]
    Init(InitOpts),

    /// Create symlinks for a profile, making it the current one
    #[command(visible_alias = "l")]
    Link(LinkOpts),

    /// List available profiles
    #[command(visible_alias = "ls")]
    List,

    /// Delete a profile from this machine
    #[command(visible_alias = "rm")]
    Remove(RemoveOpts),

    /// Run a hook by name without the surrounding command
    #[command(name = "run-hook", visible_alias = "rh")]
    RunHook(RunHookOpts),

    /// Sync the current profile and its modules with git
    #[command(visible_alias = "s")]
    Sync(SyncOpts),

    /// Print the location of the current profile
    #[command(visible_alias = "w")]
    Where,

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsOpts),
}

/// Options for the `add` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AddOpts {
    /// Files or directories to move into the profile
    #[arg(required = true)]
    pub files: Vec<std::path::PathBuf>,

    /// Store the file exactly as named instead of stripping the leading dot
    /// (can also be enabled with the DFM_KEEP_DOT environment variable)
    #[arg(short, long)]
    pub keep_dot: bool,
}

/// Options for the `clone` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CloneOpts {
    /// Repository URL to clone
    pub url: String,

    /// Profile name; defaults to the last segment of the URL
    #[arg(short, long)]
    pub name: Option<String>,

    /// Link the profile immediately after cloning
    #[arg(short, long)]
    pub link: bool,

    /// When linking, overwrite existing files and directories.
    /// THIS WILL RESULT IN DATA LOSS IF YOU ARE UNSURE — see `dfm link`
    #[arg(short, long)]
    pub overwrite: bool,
}

/// Options for the `git` passthrough subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GitOpts {
    /// Arguments handed to git unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InitOpts {
    /// Name of the profile to create
    pub name: String,
}

/// Options for the `link` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LinkOpts {
    /// Profile to link; defaults to the current profile
    pub profile: Option<String>,

    /// Compute and print the links without touching the filesystem
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Delete files and directories that exist at link destinations.
    /// DO NOT USE THIS IF YOU ARE UNSURE, IT WILL RESULT IN DATA LOSS
    #[arg(short, long)]
    pub overwrite: bool,
}

/// Options for the `remove` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RemoveOpts {
    /// Profile to delete
    pub profile: String,
}

/// Options for the `run-hook` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunHookOpts {
    /// Hook name, e.g. before_link or any user-defined name
    pub hook: String,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Commit message for local changes
    #[arg(short, long)]
    pub message: Option<String>,

    /// Sync only the profile or module with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print the git commands instead of executing them
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Options for the hidden `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
