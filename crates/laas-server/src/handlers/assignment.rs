// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/assignment/{evaluation|restriction}`

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::{Assignment, evaluate, restrict};
use laas_protocol::{AssignmentInput, BoolResult, FormulaResult};

use super::{AppState, conjunction};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

pub async fn assignment(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(operation): Path<String>,
    body: RequestBody,
) -> Response {
    match operation.as_str() {
        "evaluation" => exchange.reply(evaluation(&app, &exchange, &body).await),
        "restriction" => exchange.reply(restriction(&app, &exchange, &body).await),
        _ => exchange.fail(exchange.unknown_path()),
    }
}

fn engine_assignment(input: &AssignmentInput) -> Assignment {
    let mapping = input.assignment.as_ref().map(|a| a.mapping.as_slice()).unwrap_or_default();
    Assignment::from_pairs(
        mapping
            .iter()
            .map(|entry| (entry.variable.trim().to_string(), entry.value)),
    )
}

async fn evaluation(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<BoolResult> {
    let input: AssignmentInput = exchange.decode(body)?;
    let assignment = engine_assignment(&input);
    app.executor()
        .run(move |_| Ok(evaluate(&conjunction(&input.formulas)?, &assignment)))
        .await
        .map(BoolResult::new)
}

async fn restriction(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let input: AssignmentInput = exchange.decode(body)?;
    let assignment = engine_assignment(&input);
    app.executor()
        .run(move |_| Ok(restrict(&conjunction(&input.formulas)?, &assignment)))
        .await
        .map(|formula| FormulaResult::single(formula.to_string()))
}
