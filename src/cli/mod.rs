//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Warbler - a tiny social network
#[derive(Parser)]
#[command(name = "warbler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Apply database migrations and exit
    Migrate,

    /// Write a config file with a freshly generated secret key
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}
