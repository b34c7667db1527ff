//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::state::ImageSize;

/// ATHEA Creative Director - shooting plans from a product photo
#[derive(Parser)]
#[command(
    name = "athea",
    about = "Upload a product photo, get shooting suggestions and a shooting plan",
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

    /// Gateway base URL, overrides the config file
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in (or register with --name) and remember the user
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Register a new account with this display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Suggest shooting contexts and model styles for a product photo
    Suggest {
        /// Product photo
        image: PathBuf,
    },

    /// Generate a shooting plan
    Plan {
        /// Product photo
        image: PathBuf,

        /// Shooting context (defaults to the first suggestion)
        #[arg(long)]
        context: Option<String>,

        /// Model style (defaults to the first suggestion)
        #[arg(long)]
        model_style: Option<String>,

        /// Close-up reference photo
        #[arg(long)]
        closeup: Option<PathBuf>,

        /// Face reference photo
        #[arg(long)]
        face: Option<PathBuf>,
    },

    /// Generate a pose prompt and optionally render it
    Pose {
        /// Product photo
        image: PathBuf,

        /// Creative concept
        #[arg(long)]
        concept: String,

        /// Pose to describe
        #[arg(long)]
        pose: String,

        /// Shooting context passed as user context
        #[arg(long, default_value = "")]
        context: String,

        /// Also render the image at this size (1K, 2K, 4K)
        #[arg(long)]
        render: Option<ImageSize>,

        /// Write the rendered PNG here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
