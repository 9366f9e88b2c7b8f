mod main_runtime;

use anyhow::{Context, Result};
use clap::Parser;
use kiddush_cup::adapters::{source_from_location, ConsoleSurface};
use kiddush_cup::cli::{self, Cli, Commands, OutputMode};
use kiddush_cup::config::AppConfig;
use kiddush_cup::error::CupError;
use kiddush_cup::services::ScoreboardService;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run { no_clear: false }) {
        Commands::Run { no_clear } => {
            init_logging(&config.logging);
            run_board(&config, !no_clear)
                .await
                .context("scoreboard stopped with an error")?;
        }
        Commands::Snapshot { json } => {
            init_logging_simple();
            cli::show_snapshot(&config, OutputMode::from_json_flag(json))
                .await
                .with_context(|| format!("failed to read feed {}", config.feed.source))?;
        }
        Commands::Countdown => {
            init_logging_simple();
            println!("{}", cli::countdown_line(&config, chrono::Utc::now())?);
        }
    }

    Ok(())
}

/// Load and validate configuration; any problem here is fatal
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_from(&cli.config_dir)
        .with_context(|| format!("failed to load configuration from {}", cli.config_dir))?;
    if let Some(feed) = &cli.feed {
        config.feed.source = feed.clone();
    }

    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("config: {e}");
        }
        return Err(CupError::InvalidConfig(errors.join("; ")).into());
    }
    Ok(config)
}

async fn run_board(config: &AppConfig, clear_screen: bool) -> Result<()> {
    let feed = source_from_location(
        &config.feed.source,
        Duration::from_millis(config.feed.timeout_ms),
    )
    .with_context(|| format!("invalid feed source {}", config.feed.source))?;
    let surface = Arc::new(ConsoleSurface::new(clear_screen));
    let service = ScoreboardService::new(config, Arc::from(feed), surface)?;

    let state = service.run(shutdown_signal()).await?;
    match state.outcome {
        Some(outcome) => info!(
            "Final: {} ({} - {})",
            outcome, state.totals.left, state.totals.right
        ),
        None => info!("Stopped before the event ended"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
