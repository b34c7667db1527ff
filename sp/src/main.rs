//! ATHEA Studio
//!
//! CLI entry point standing in for the presentation layer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use studio::backend::BackendClient;
use studio::cli::{Cli, Command};
use studio::config::Config;
use studio::orchestrator::Orchestrator;
use studio::reporter::TracingReporter;
use studio::session::{FileSessionStore, User};
use studio::state::{ImageSize, ShootingPlanState};

/// Pose identifier used for single-pose CLI runs
const CLI_POSE_ID: &str = "pose-1";

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("athea")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

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

    let log_file = fs::File::create(log_dir.join("athea.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let base_url = cli.backend.clone().unwrap_or_else(|| config.backend.base_url.clone());
    info!("athea using gateway at {}", base_url);

    let orchestrator = Orchestrator::new(
        Arc::new(BackendClient::new(base_url)),
        Arc::new(FileSessionStore::new(config.session.resolved_dir())),
        Arc::new(TracingReporter),
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Login { email, password, name } => cmd_login(&orchestrator, &email, &password, name.as_deref()),
        Command::Logout => cmd_logout(&orchestrator),
        Command::Whoami => cmd_whoami(&orchestrator),
        Command::Suggest { image } => {
            require_user(&orchestrator)?;
            cmd_suggest(&orchestrator, &image).await
        }
        Command::Plan {
            image,
            context,
            model_style,
            closeup,
            face,
        } => {
            require_user(&orchestrator)?;
            cmd_plan(&orchestrator, &image, context, model_style, closeup, face).await
        }
        Command::Pose {
            image,
            concept,
            pose,
            context,
            render,
            output,
        } => {
            require_user(&orchestrator)?;
            cmd_pose(&orchestrator, &image, &concept, &pose, &context, render, output).await
        }
    }
}

fn require_user(orchestrator: &Orchestrator) -> Result<User> {
    orchestrator
        .user()
        .ok_or_else(|| eyre!("Not signed in. Run `athea login` first."))
}

fn cmd_login(orchestrator: &Orchestrator, email: &str, password: &str, name: Option<&str>) -> Result<()> {
    debug!(%email, "cmd_login: called");
    let user = User::from_login(email, password, name, name.is_some())?;
    orchestrator.login(user.clone()).context("Failed to save session")?;
    println!("{} Signed in as {} <{}>", "✓".green(), user.name.cyan(), user.email);
    Ok(())
}

fn cmd_logout(orchestrator: &Orchestrator) -> Result<()> {
    debug!("cmd_logout: called");
    orchestrator.logout().context("Failed to clear session")?;
    println!("{} Signed out", "✓".green());
    Ok(())
}

fn cmd_whoami(orchestrator: &Orchestrator) -> Result<()> {
    match orchestrator.user() {
        Some(user) => println!("{} <{}>", user.name.cyan(), user.email),
        None => println!("{}", "Not signed in".yellow()),
    }
    Ok(())
}

fn print_suggestions(state: &ShootingPlanState) {
    if state.suggested_contexts.is_empty() && state.suggested_model_styles.is_empty() {
        println!("{}", "No suggestions (see the log for details)".yellow());
        return;
    }
    println!("{}", "Shooting contexts".bold());
    for (i, c) in state.suggested_contexts.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), c);
    }
    println!("{}", "Model styles".bold());
    for (i, s) in state.suggested_model_styles.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), s);
    }
}

async fn cmd_suggest(orchestrator: &Orchestrator, image: &Path) -> Result<()> {
    debug!(?image, "cmd_suggest: called");
    orchestrator.handle_image_upload(image).await?;
    print_suggestions(&orchestrator.snapshot());
    Ok(())
}

async fn cmd_plan(
    orchestrator: &Orchestrator,
    image: &Path,
    context: Option<String>,
    model_style: Option<String>,
    closeup: Option<PathBuf>,
    face: Option<PathBuf>,
) -> Result<()> {
    debug!(?image, "cmd_plan: called");
    orchestrator.handle_image_upload(image).await?;
    if let Some(path) = closeup {
        orchestrator.set_closeup_image(path).await?;
    }
    if let Some(path) = face {
        orchestrator.set_face_image(path).await?;
    }

    let snapshot = orchestrator.snapshot();
    let context = context.or_else(|| snapshot.suggested_contexts.first().cloned());
    let model_style = model_style.or_else(|| snapshot.suggested_model_styles.first().cloned());
    let (Some(context), Some(model_style)) = (context, model_style) else {
        return Err(eyre!("No context or model style given and none suggested"));
    };
    println!("{} {}", "Context:".bold(), context);
    println!("{} {}", "Model style:".bold(), model_style);
    orchestrator.set_context(context);
    orchestrator.set_model_style(model_style);

    orchestrator.handle_generate_plan().await;

    let state = orchestrator.snapshot();
    if let Some(error) = state.error {
        return Err(eyre!("Plan generation failed: {}", error));
    }
    println!();
    println!("{}", state.plan_result.unwrap_or_default());
    Ok(())
}

async fn cmd_pose(
    orchestrator: &Orchestrator,
    image: &Path,
    concept: &str,
    pose: &str,
    context: &str,
    render: Option<ImageSize>,
    output: Option<PathBuf>,
) -> Result<()> {
    debug!(?image, %concept, "cmd_pose: called");
    orchestrator.handle_image_upload(image).await?;
    orchestrator.set_context(context);

    orchestrator.handle_generate_pose_prompt(CLI_POSE_ID, concept, pose).await;
    let state = orchestrator.snapshot();
    if let Some(error) = state.error {
        return Err(eyre!("Pose prompt failed: {}", error));
    }
    let json = state.pose_prompts.get(CLI_POSE_ID).cloned().unwrap_or_default();
    println!("{}", json);

    let Some(size) = render else {
        return Ok(());
    };
    orchestrator.set_image_size(size);
    orchestrator.handle_generate_pose_image(CLI_POSE_ID).await;

    let state = orchestrator.snapshot();
    if let Some(error) = state.error {
        return Err(eyre!("Image generation failed: {}", error));
    }
    let uri = state.pose_images.get(CLI_POSE_ID).cloned().unwrap_or_default();
    let payload = uri.split_once(',').map(|(_, p)| p).unwrap_or(&uri);
    let bytes = STANDARD.decode(payload).context("Gateway returned invalid base64")?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.png", CLI_POSE_ID)));
    fs::write(&output, bytes).context(format!("Failed to write {}", output.display()))?;
    println!("{} Image written to {}", "✓".green(), output.display().to_string().cyan());
    Ok(())
}
