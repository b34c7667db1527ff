//! ATHEA Gateway
//!
//! CLI entry point for the shooting-plan gateway.

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use gateway::api;
use gateway::cli::{Cli, Command};
use gateway::config::Config;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve { bind }) => {
            if let Some(bind) = bind {
                debug!(%bind, "main: overriding bind address");
                config.server.bind = bind;
            }
            cmd_serve(&config).await
        }
        None => cmd_serve(&config).await,
    }
}

/// Serve until ctrl-c; a missing credential is logged but does not stop startup
async fn cmd_serve(config: &Config) -> Result<()> {
    debug!("cmd_serve: called");
    config.validate_limits().context("Invalid configuration")?;
    if let Err(e) = config.validate() {
        warn!("{}", e);
    }
    info!(
        "athea-gw starting: provider={}, bind={}",
        config.llm.provider, config.server.bind
    );
    api::serve(config).await
}

/// Print the effective configuration and whether it is usable
fn cmd_check_config(config: &Config) -> Result<()> {
    debug!("cmd_check_config: called");
    print!("{}", serde_yaml::to_string(config).context("Failed to render config")?);
    match config.validate() {
        Ok(()) => {
            println!("Configuration OK");
            Ok(())
        }
        Err(e) => {
            println!("Configuration problem: {}", e);
            Err(e)
        }
    }
}
