use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "create-any",
    about = "Scaffold files from templates found in your project",
    version
)]
pub struct Cli {
    /// Print debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create files from a template
    New {
        /// Write into the destination even if it already has entries
        #[arg(long)]
        allow_non_empty: bool,

        /// Template id followed by answers as flags, e.g. `react-component --name=Button`
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "TEMPLATE [--KEY VALUE]..."
        )]
        args: Vec<String>,
    },

    /// List the templates available from the current directory
    List,
}
