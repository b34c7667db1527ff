//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ATHEA Gateway - shooting-plan generation service
#[derive(Parser)]
#[command(
    name = "athea-gw",
    about = "JSON gateway between the ATHEA studio and the generative-AI provider",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway (default)
    Serve {
        /// Address to bind, overrides the config file
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}
