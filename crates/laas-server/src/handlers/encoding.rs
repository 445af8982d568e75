// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/encoding/{cc|pbc}`
//!
//! Every input item is encoded on its own. Auxiliary variable numbering is
//! shared across the items of one request, so encodings of different items
//! never collide.

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::clause::{AuxVars, CC_PREFIX, PB_PREFIX};
use laas_engine::encoding::{encode_cc, encode_pbc};
use laas_protocol::FormulaResult;

use super::{AppState, on_items};
use crate::dispatch::{CC, PBC};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

pub async fn encoding(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(kind): Path<String>,
    body: RequestBody,
) -> Response {
    match kind.as_str() {
        "cc" => exchange.reply(cardinality(&app, &exchange, &body).await),
        "pbc" => exchange.reply(pseudo_boolean(&app, &exchange, &body).await),
        _ => exchange.fail(exchange.unknown_path()),
    }
}

async fn cardinality(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let algorithm = CC.resolve(exchange.param(CC.parameter()))?;
    on_items(app, exchange, body, move |items, formulas, deadline| {
        let mut aux = AuxVars::new(CC_PREFIX);
        let mut encoded = Vec::with_capacity(items.len());
        for (item, formula) in items.iter().zip(&formulas) {
            deadline.check()?;
            let cnf = encode_cc(formula, algorithm, &mut aux, deadline)?;
            encoded.push(item.with_formula(cnf.to_string()));
        }
        Ok(FormulaResult::new(encoded))
    })
    .await
}

async fn pseudo_boolean(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let algorithm = PBC.resolve(exchange.param(PBC.parameter()))?;
    on_items(app, exchange, body, move |items, formulas, deadline| {
        let mut aux = AuxVars::new(PB_PREFIX);
        let mut encoded = Vec::with_capacity(items.len());
        for (item, formula) in items.iter().zip(&formulas) {
            deadline.check()?;
            let cnf = encode_pbc(formula, algorithm, &mut aux, deadline)?;
            encoded.push(item.with_formula(cnf.to_string()));
        }
        Ok(FormulaResult::new(encoded))
    })
    .await
}
