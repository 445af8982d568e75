// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request middleware.
//!
//! [`correlation`] runs outermost: it creates the [`RequestContext`], puts it
//! into the request extensions and echoes the correlation id. Inside it,
//! [`track_computation`] times the request and logs the computation state
//! the handler left behind.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span, warn};

use crate::context::{CORRELATION_ID_HEADER, RequestContext};

/// Adopt or issue the correlation id and run the request inside its span.
pub async fn correlation(mut request: Request, next: Next) -> Response {
    let inbound = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    let context = RequestContext::adopt(inbound);
    request.extensions_mut().insert(context.clone());

    let span = info_span!("request", correlation_id = %context.correlation_id());
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(context.correlation_id()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

/// Log path, duration and outcome of every request.
pub async fn track_computation(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let context = request.extensions().get::<RequestContext>().cloned();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    match context.map(|c| c.state()) {
        Some(state) if !state.success => {
            warn!(path = %path, elapsed_ms, status, error = %state.error, "Computation failed");
        }
        _ => info!(path = %path, elapsed_ms, status, "Computation finished"),
    }
    response
}
