// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cooperative cancellation for long-running computations.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{EngineError, Result};

/// Abort signal observed by every search loop in the engine.
///
/// Combines an external [`CancellationToken`] with an optional expiry. The
/// engine polls [`Deadline::check`] between steps and unwinds with
/// [`EngineError::Aborted`] once either fires.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Deadline controlled by `token` that also expires after `timeout`.
    pub fn new(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    /// Deadline controlled by `token` only.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            expires_at: None,
        }
    }

    /// A deadline that never fires.
    pub fn unbounded() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// True once the token was cancelled or the expiry passed.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled() || self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// `Err(Aborted)` once the deadline fired.
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            Err(EngineError::Aborted)
        } else {
            Ok(())
        }
    }

    /// The underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
