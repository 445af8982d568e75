// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/prime/minimal-implicant` and `/prime/minimal-cover`

use axum::extract::State;
use axum::response::Response;
use laas_engine::prime;
use laas_protocol::{FormulaItem, FormulaResult};

use super::{AppState, on_conjunction};
use crate::dispatch::PRIME_COVER;
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

/// A smallest conjunction of literals implying the input.
pub async fn minimal_implicant(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_conjunction(&app, &exchange, &body, |formula, deadline| {
        let implicant = prime::minimum_implicant(&formula, deadline)?;
        Ok(FormulaResult::single(prime::term_formula(&implicant).to_string()))
    })
    .await;
    exchange.reply(outcome)
}

/// Prime implicants whose disjunction is equivalent to the input, one item
/// per implicant.
pub async fn minimal_cover(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(cover(&app, &exchange, &body).await)
}

async fn cover(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let algorithm = PRIME_COVER.resolve(exchange.param(PRIME_COVER.parameter()))?;
    on_conjunction(app, exchange, body, move |formula, deadline| {
        let implicants = prime::cover(&formula, algorithm, deadline)?;
        Ok(FormulaResult::new(
            implicants
                .iter()
                .map(|term| FormulaItem::new(prime::term_formula(term).to_string()))
                .collect(),
        ))
    })
    .await
}
