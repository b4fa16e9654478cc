use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
pub struct ServeArgs {
    /// Load configuration from a custom location. Defaults to: $XDG_CONFIG/baseplate/config.yml
    #[arg(short, long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Override the configured listen address
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<String>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Print a config template
    ConfigTemplate,
    /// Create a config file. Defaults to: $XDG_CONFIG/baseplate/config.yml
    ConfigInit {
        /// Create configuration at a custom location.
        #[arg(short, long = "config", value_name = "FILE")]
        config_path: Option<PathBuf>,
    },
    /// Validate every layout template and exit
    Check {
        #[command(flatten)]
        args: ServeArgs,
    },
}

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Server-rendered dashboard with composable layouts")]
#[command(subcommand_negates_reqs(true))]
#[command(args_conflicts_with_subcommands(true))]
pub struct Cli {
    #[command(flatten)]
    pub args: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}
