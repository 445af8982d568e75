// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for laas-server.

use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SYNC_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host the HTTP listener binds to
    pub host: String,
    /// Port the HTTP listener binds to
    pub port: u16,
    /// Deadline applied to every computation
    pub sync_timeout: Duration,
    /// How long in-flight requests may take to drain on shutdown
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sync_timeout: Duration::from_millis(DEFAULT_SYNC_TIMEOUT_MS),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LAAS_HOST` | `localhost` |
    /// | `LAAS_PORT` | `8080` |
    /// | `LAAS_SYNC_TIMEOUT_MS` | `5000` |
    /// | `LAAS_SHUTDOWN_GRACE_SECS` | `10` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("LAAS_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = parse_var("LAAS_PORT", DEFAULT_PORT)?;

        let sync_timeout =
            Duration::from_millis(parse_var("LAAS_SYNC_TIMEOUT_MS", DEFAULT_SYNC_TIMEOUT_MS)?);

        let grace_secs: u64 = parse_var("LAAS_SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE_SECS)?;
        if grace_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "LAAS_SHUTDOWN_GRACE_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            sync_timeout,
            shutdown_grace: Duration::from_secs(grace_secs),
        })
    }

    /// `host:port` as passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        _ => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value '{value}' for environment variable {var}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}
