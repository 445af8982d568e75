// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Model counting and DNNF compilation.
//!
//! Counts are written as decimal strings since they exceed 64 bits.

use axum::extract::State;
use axum::response::Response;
use laas_engine::{counting, dnnf};
use laas_protocol::{FormulaResult, FormulaVarsInput, StringResult};

use super::{AppState, conjunction, on_conjunction};
use crate::dispatch::{COUNT, PROJECTED_COUNT};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

/// `/model/counting`
pub async fn counting(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(count(&app, &exchange, &body).await)
}

/// `/model/counting/projection`
pub async fn projection(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(count_projected(&app, &exchange, &body).await)
}

/// `/dnnf/compilation`
pub async fn compilation(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_conjunction(&app, &exchange, &body, |formula, deadline| {
        Ok(FormulaResult::single(dnnf::compile(&formula, deadline)?.to_string()))
    })
    .await;
    exchange.reply(outcome)
}

async fn count(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<StringResult> {
    let algorithm = COUNT.resolve(exchange.param(COUNT.parameter()))?;
    on_conjunction(app, exchange, body, move |formula, deadline| {
        let models = counting::count(&formula, algorithm, deadline)?;
        Ok(StringResult::new(models.to_string()))
    })
    .await
}

async fn count_projected(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<StringResult> {
    let algorithm = PROJECTED_COUNT.resolve(exchange.param(PROJECTED_COUNT.parameter()))?;
    let input: FormulaVarsInput = exchange.decode(body)?;
    app.executor()
        .run(move |deadline| {
            let formula = conjunction(&input.formulas)?;
            let variables: Vec<String> = input
                .variables
                .iter()
                .map(|v| v.trim().to_string())
                .collect();
            let models = counting::count_projected(&formula, &variables, algorithm, deadline)?;
            Ok(StringResult::new(models.to_string()))
        })
        .await
}
