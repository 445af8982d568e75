// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request-scoped computation state and correlation id.

use std::sync::{Arc, Mutex, PoisonError};

use laas_protocol::ComputationState;
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Per-request record shared between the middleware and the handler.
///
/// Created by the correlation middleware, stored in the request extensions
/// and dropped with the request. The state starts as success and is turned
/// into a failure at most once.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: Arc<str>,
    state: Arc<Mutex<ComputationState>>,
}

impl RequestContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        let correlation_id: String = correlation_id.into();
        Self {
            correlation_id: correlation_id.into(),
            state: Arc::new(Mutex::new(ComputationState::success())),
        }
    }

    /// Adopt an inbound id, or issue a fresh one when absent or blank.
    pub fn adopt(inbound: Option<&str>) -> Self {
        match inbound.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::new(id),
            None => Self::new(Uuid::new_v4().to_string()),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Mark the computation as failed. Later failures keep the first message.
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.success {
            *state = ComputationState::failure(error);
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ComputationState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::adopt(None)
    }
}
