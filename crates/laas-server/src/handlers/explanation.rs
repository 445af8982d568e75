// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/explanation/mus` and `/explanation/smus`

use axum::extract::State;
use axum::response::Response;
use laas_engine::{Formula, explanation};
use laas_protocol::{FormulaItem, FormulaResult};

use super::{AppState, on_items};
use crate::dispatch::MUS;
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

/// Minimal unsatisfiable subset of the input items, in input order.
pub async fn mus(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(minimal_subset(&app, &exchange, &body).await)
}

/// Smallest unsatisfiable subset of the input items, in input order.
pub async fn smus(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_items(&app, &exchange, &body, |items, formulas, deadline| {
        let selected = explanation::smus(&formulas, deadline)?;
        Ok(subset(&items, &formulas, selected))
    })
    .await;
    exchange.reply(outcome)
}

async fn minimal_subset(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let algorithm = MUS.resolve(exchange.param(MUS.parameter()))?;
    on_items(app, exchange, body, move |items, formulas, deadline| {
        let selected = explanation::mus(&formulas, algorithm, deadline)?;
        Ok(subset(&items, &formulas, selected))
    })
    .await
}

fn subset(items: &[FormulaItem], formulas: &[Formula], selected: Vec<usize>) -> FormulaResult {
    FormulaResult::new(
        selected
            .into_iter()
            .map(|i| items[i].with_formula(formulas[i].to_string()))
            .collect(),
    )
}
