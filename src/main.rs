use anyhow::Result;
use clap::Parser as _;
use tracing::{debug, error};

use dfm::cli::{Cli, Command};
use dfm::{commands, logging};

fn main() {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init(args.verbose, args.debug);

    // An interrupted run exits cleanly non-zero; re-running the link pass
    // recomputes the full link set, so a partial pass self-heals.
    if let Err(err) = ctrlc::set_handler(|| {
        eprintln!("interrupted");
        std::process::exit(130);
    }) {
        debug!("could not install interrupt handler: {err}");
    }

    if let Err(err) = run(args) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    match args.command {
        Command::Add(opts) => commands::add::run(&opts),
        Command::Clean => commands::clean::run(),
        Command::Clone(opts) => commands::clone::run(&opts),
        Command::Git(opts) => commands::git::run(&opts),
        Command::Init(opts) => commands::init::run(&opts),
        Command::Link(opts) => commands::link::run(&opts),
        Command::List => commands::list::run(),
        Command::Remove(opts) => commands::remove::run(&opts),
        Command::RunHook(opts) => commands::run_hook::run(&opts),
        Command::Sync(opts) => commands::sync::run(&opts),
        Command::Where => commands::where_cmd::run(),
        Command::Completions(opts) => commands::completions::run(&opts),
    }
}
