// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LaaS Server - HTTP surface of the logic service
//!
//! # Architecture
//!
//! ```text
//!  request
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ TraceLayer → correlation → track_computation   (middleware)  │
//! └──────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌──────────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │ Exchange         │──►│ handler          │──►│ BoundedExecutor    │
//! │ decode / reply   │   │ dispatch tables  │   │ spawn_blocking +   │
//! └──────────────────┘   └──────────────────┘   │ Deadline           │
//!                                               └────────────────────┘
//!                                                         │
//!                                                         ▼
//!                                                    laas-engine
//! ```
//!
//! Every response is a result envelope: `state` plus payload on success,
//! `state` alone on failure. The failure message is the `Display` of a
//! [`ServiceError`], whose kind also picks the HTTP status.
//!
//! # Configuration
//!
//! See [`config::Config::from_env`].

pub mod config;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod middleware;
pub mod runtime;
pub mod server;

pub use config::Config;
pub use error::{ErrorKind, Result, ServiceError};
pub use handlers::AppState;
pub use runtime::ServerRuntime;
pub use server::router;
