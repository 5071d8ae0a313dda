mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            path,
            merge,
            docker,
            openshift,
            data,
            templates,
            dry_run,
        } => commands::apply::run(
            path,
            merge,
            docker,
            openshift,
            data,
            templates,
            dry_run,
            cli.verbose,
        ),
        Commands::Check { path } => commands::check::run(path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "graft=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
