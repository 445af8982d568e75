// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embeddable runtime for laas-server.
//!
//! ```rust,ignore
//! use laas_server::config::Config;
//! use laas_server::runtime::ServerRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ServerRuntime::builder()
//!         .config(Config::from_env()?)
//!         .build()?
//!         .start()
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatch;
use crate::handlers::AppState;
use crate::server::router;

/// Builder for a [`ServerRuntime`].
#[derive(Debug, Default)]
pub struct ServerRuntimeBuilder {
    config: Option<Config>,
}

impl ServerRuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    ///
    /// Default: [`Config::default`]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the runtime configuration. Fails when a dispatch table is
    /// malformed.
    pub fn build(self) -> Result<ServerRuntimeConfig> {
        dispatch::validate_all()?;
        Ok(ServerRuntimeConfig {
            config: self.config.unwrap_or_default(),
        })
    }
}

/// Configuration for a [`ServerRuntime`].
#[derive(Debug)]
pub struct ServerRuntimeConfig {
    config: Config,
}

impl ServerRuntimeConfig {
    /// Bind the listener and spawn the HTTP server.
    pub async fn start(self) -> Result<ServerRuntime> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let local_addr = listener.local_addr()?;
        let shutdown_grace = self.config.shutdown_grace;
        let sync_timeout = self.config.sync_timeout;

        let app = router(AppState::new(self.config));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_handle = tokio::spawn(run_server_with_shutdown(listener, app, shutdown_rx));

        info!(
            addr = %local_addr,
            sync_timeout_ms = sync_timeout.as_millis() as u64,
            "ServerRuntime started"
        );

        Ok(ServerRuntime {
            server_handle,
            shutdown_tx,
            local_addr,
            shutdown_grace,
        })
    }
}

/// A running laas-server that can be embedded in an application.
///
/// Call [`shutdown`](Self::shutdown) to stop accepting connections and
/// drain in-flight requests.
pub struct ServerRuntime {
    server_handle: JoinHandle<Result<()>>,
    shutdown_tx: watch::Sender<bool>,
    local_addr: SocketAddr,
    shutdown_grace: Duration,
}

impl ServerRuntime {
    pub fn builder() -> ServerRuntimeBuilder {
        ServerRuntimeBuilder::new()
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        !self.server_handle.is_finished()
    }

    /// Stop accepting connections and wait for in-flight requests, at most
    /// for the shutdown grace period. Requests still running after it are
    /// dropped.
    pub async fn shutdown(self) -> Result<()> {
        info!("ServerRuntime shutting down...");
        let _ = self.shutdown_tx.send(true);

        let mut server_handle = self.server_handle;
        match tokio::time::timeout(self.shutdown_grace, &mut server_handle).await {
            Ok(Ok(Ok(()))) => {
                info!("ServerRuntime shutdown complete");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!("ServerRuntime error during shutdown: {}", e);
                Err(e)
            }
            Ok(Err(e)) => {
                error!("ServerRuntime task panicked: {}", e);
                Err(anyhow::anyhow!("server task panicked: {}", e))
            }
            Err(_) => {
                warn!(
                    grace_secs = self.shutdown_grace.as_secs(),
                    "Grace period elapsed, aborting remaining requests"
                );
                server_handle.abort();
                Ok(())
            }
        }
    }
}

async fn run_server_with_shutdown(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // a dropped sender also stops the server
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            info!("HTTP server received shutdown signal");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn local_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_serves_health_and_shuts_down() {
        let runtime = ServerRuntime::builder()
            .config(local_config())
            .build()
            .unwrap()
            .start()
            .await
            .unwrap();
        assert!(runtime.is_running());

        let mut stream = TcpStream::connect(runtime.local_addr()).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("x-correlation-id"));
        assert!(response.ends_with("ok"));

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = Config {
            port: taken.local_addr().unwrap().port(),
            ..local_config()
        };
        let started = ServerRuntime::builder().config(config).build().unwrap().start().await;
        assert!(started.is_err());
    }
}
