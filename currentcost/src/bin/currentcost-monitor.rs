// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::Parser;
use currentcost::{LoggingHandler, Monitor, MonitorConfig, SerialTransport};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Log readings from a CurrentCost display unit.
#[derive(Debug, Parser)]
#[command(name = "currentcost-monitor", version, about)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "monitor.toml")]
    config: PathBuf,
}

fn init_tracing(level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{level},currentcost={level}").into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = MonitorConfig::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    init_tracing(config.log_filter())?;

    let cancel = CancellationToken::new();
    let transport = SerialTransport::from_config(&config)
        .spawn(cancel.clone())
        .context("failed to start serial transport")?;

    let monitor = Monitor::new(&config, LoggingHandler::default());
    let run = tokio::spawn(monitor.run(transport, cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");
    cancel.cancel();

    let handler = run.await.context("monitor task failed")?;
    tracing::info!(
        periodic_updates = handler.periodic_updates(),
        history_updates = handler.history_updates(),
        "monitor stopped"
    );
    Ok(())
}
