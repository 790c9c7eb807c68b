mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

/// Environment variable overriding the log filter, e.g. `CREATE_ANY_LOG=trace`.
const LOG_ENV: &str = "CREATE_ANY_LOG";

fn init_logging(verbose: bool) {
    // Discovery warnings are already shown by the reporter.
    let default_level = if verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::New {
            allow_non_empty,
            args,
        } => commands::new::run(cli.cwd, allow_non_empty, args),
        Commands::List => commands::list::run(cli.cwd),
    }
}
