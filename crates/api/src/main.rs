//! Autopost - scheduled post generation and publishing
//!
//! Main entry point for the command line application.

use std::process::ExitCode;

use anyhow::{Context, Result};
use autopost_app::utils::health::check_config;
use autopost_app::utils::logging::init_tracing;
use autopost_app::{AppContext, Cli, Command};
use autopost_domain::AppConfig;
use autopost_infra::config;
use clap::Parser;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging FIRST so we can see .env loading
    init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = format!("{err:#}"), "autopost failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;

    match cli.command() {
        Command::Check => Ok(check(&config)),
        Command::Once => once(config).await,
        Command::Run => run_scheduled(config).await,
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let loaded = match &cli.config {
        Some(path) => config::load_from_file(path),
        None => config::load(),
    };
    loaded.context("failed to load configuration")
}

#[allow(clippy::print_stdout)]
fn check(config: &AppConfig) -> ExitCode {
    let status = check_config(config);
    for component in &status.components {
        let mark = if component.is_healthy { "ok" } else { "FAIL" };
        match &component.message {
            Some(message) => println!("{mark:>4}  {}: {message}", component.name),
            None => println!("{mark:>4}  {}", component.name),
        }
    }

    if status.is_healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[allow(clippy::print_stdout)]
async fn once(config: AppConfig) -> Result<ExitCode> {
    let context = AppContext::new_with_config(config).context("failed to initialize")?;
    context.cycle.preflight().context("not ready to run")?;
    let report = context.run_once().await.context("manual cycle rejected")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run_scheduled(config: AppConfig) -> Result<ExitCode> {
    let mut context = AppContext::new_with_config(config).context("failed to initialize")?;
    context.cycle.preflight().context("not ready to schedule")?;

    context.start().await.context("failed to start scheduler")?;
    let status = context.schedule_status();
    info!(
        interval_secs = status.interval.as_secs(),
        next_run_at = ?status.next_run_at,
        "Autopost running; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");

    context.shutdown().await.context("failed to stop scheduler")?;
    info!("Autopost stopped");
    Ok(ExitCode::SUCCESS)
}
