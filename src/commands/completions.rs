//! The hidden `completions` subcommand.

use anyhow::Result;
use clap::CommandFactory as _;

use crate::cli::{Cli, CompletionsOpts};

/// Write shell completions for the requested shell to stdout.
pub fn run(opts: &CompletionsOpts) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(opts.shell, &mut command, "dfm", &mut std::io::stdout());
    Ok(())
}
