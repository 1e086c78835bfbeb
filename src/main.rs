//! Poolroute Worker - route sequencing and proximity search for technician scheduling
//!
//! This worker connects to NATS and answers requests from the scheduling application.

mod cli;
mod config;
mod db;
mod handlers;
mod services;
mod types;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::cli::{Cli, Command};
use crate::db::PgStopStore;
use crate::services::planner::RoutePlanner;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,poolroute_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())  // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    info!("Connected to PostgreSQL");

    db::run_migrations(&pool).await?;
    if matches!(command, Command::Migrate) {
        return Ok(());
    }

    let planner = RoutePlanner::new(Arc::new(PgStopStore::new(pool)), config.planner_settings());

    if let Command::OptimizeDay { date, .. } = command {
        let summary = planner.optimize_day(date, command.sequence_mode()).await?;
        info!(
            "Optimized {} routes for {} ({} with nothing to sequence, {} failed)",
            summary.optimized.len(),
            date,
            summary.nothing_to_sequence.len(),
            summary.failed.len()
        );
        println!("{}", serde_json::to_string_pretty(&summary)?);
        if !summary.failed.is_empty() {
            anyhow::bail!("{} routes failed to optimize", summary.failed.len());
        }
        return Ok(());
    }

    info!("Starting Poolroute Worker...");

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, planner).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
