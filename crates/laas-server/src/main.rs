// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LaaS Server - Logic as a Service
//!
//! An HTTP server exposing propositional logic computations: normal forms,
//! SAT and MaxSAT, encodings, counting, explanations and formula
//! generation. Requests and results are JSON or protocol buffers.

use tracing::{info, warn};

use laas_server::config::Config;
use laas_server::runtime::ServerRuntime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laas_server=info,tower_http=info".into()),
        )
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;

    info!(
        bind_addr = %config.bind_addr(),
        sync_timeout_ms = config.sync_timeout.as_millis() as u64,
        shutdown_grace_secs = config.shutdown_grace.as_secs(),
        "Starting LaaS Server"
    );

    let runtime = ServerRuntime::builder()
        .config(config)
        .build()?
        .start()
        .await?;

    info!(addr = %runtime.local_addr(), "LaaS Server ready");

    shutdown_signal().await?;
    info!("Shutdown signal received");

    runtime.shutdown().await?;

    info!("LaaS Server shut down");

    Ok(())
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
