// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/formula/{function}`: structural functions of the conjunction.

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::{functions, graph};
use laas_protocol::{
    FormulaItem, FormulaResult, IntResult, ProfileResult, StringResult, StringSetResult,
};

use super::{AppState, on_conjunction};
use crate::dispatch::{FORMULA_GRAPH_TYPE, GRAPH_FORMAT};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

pub async fn formula(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(function): Path<String>,
    body: RequestBody,
) -> Response {
    let (app, exchange, body) = (&app, &exchange, &body[..]);
    match function.as_str() {
        "depth" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(IntResult::new(functions::depth(&f)))
            })
            .await,
        ),
        "atoms" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(IntResult::new(functions::atoms(&f)))
            })
            .await,
        ),
        "nodes" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(IntResult::new(functions::nodes(&f)))
            })
            .await,
        ),
        "variables" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(StringSetResult::new(functions::variables(&f)))
            })
            .await,
        ),
        "literals" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(StringSetResult::new(functions::literals(&f)))
            })
            .await,
        ),
        "sub-formulas" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(FormulaResult::new(
                    functions::sub_formulas(&f)
                        .iter()
                        .map(|sub| FormulaItem::new(sub.to_string()))
                        .collect(),
                ))
            })
            .await,
        ),
        "var-profile" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(ProfileResult::new(functions::variable_profile(&f)))
            })
            .await,
        ),
        "lit-profile" => exchange.reply(
            on_conjunction(app, exchange, body, |f, _| {
                Ok(ProfileResult::new(functions::literal_profile(&f)))
            })
            .await,
        ),
        "graphical" => exchange.reply(graphical(app, exchange, body).await),
        _ => exchange.fail(exchange.unknown_path()),
    }
}

/// Syntax graph of the conjunction, `type` selecting node sharing.
async fn graphical(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<StringResult> {
    let kind = FORMULA_GRAPH_TYPE.resolve(exchange.param(FORMULA_GRAPH_TYPE.parameter()))?;
    let format = GRAPH_FORMAT.resolve(exchange.param(GRAPH_FORMAT.parameter()))?;
    on_conjunction(app, exchange, body, move |f, _| {
        let graph = graph::formula_graph(&f, kind);
        Ok(StringResult::new(graph::render_formula_graph(&graph, format)))
    })
    .await
}
