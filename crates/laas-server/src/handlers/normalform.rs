// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/normalform/transformation/{form}` and `/normalform/predicate/{form}`.

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::{Formula, normalform};
use laas_protocol::{BoolResult, FormulaResult};

use super::{AppState, on_conjunction};
use crate::dispatch::{CNF, DNF};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

pub async fn transformation(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(form): Path<String>,
    body: RequestBody,
) -> Response {
    match form.as_str() {
        "nnf" | "cnf" | "dnf" | "aig" => {
            exchange.reply(transform(&app, &exchange, &body, &form).await)
        }
        _ => exchange.fail(exchange.unknown_path()),
    }
}

pub async fn predicate(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(form): Path<String>,
    body: RequestBody,
) -> Response {
    let test: fn(&Formula) -> bool = match form.as_str() {
        "nnf" => normalform::is_nnf,
        "cnf" => normalform::is_cnf,
        "dnf" => normalform::is_dnf,
        "aig" => normalform::is_aig,
        "minterm" => normalform::is_minterm,
        "maxterm" => normalform::is_maxterm,
        _ => return exchange.fail(exchange.unknown_path()),
    };
    let outcome = on_conjunction(&app, &exchange, &body, move |formula, _| {
        Ok(BoolResult::new(test(&formula)))
    })
    .await;
    exchange.reply(outcome)
}

async fn transform(
    app: &AppState,
    exchange: &Exchange,
    body: &[u8],
    form: &str,
) -> Result<FormulaResult> {
    let converted = match form {
        "cnf" => {
            let algorithm = CNF.resolve(exchange.param(CNF.parameter()))?;
            on_conjunction(app, exchange, body, move |f, deadline| {
                normalform::cnf(&f, algorithm, deadline)
            })
            .await?
        }
        "dnf" => {
            let algorithm = DNF.resolve(exchange.param(DNF.parameter()))?;
            on_conjunction(app, exchange, body, move |f, deadline| {
                normalform::dnf(&f, algorithm, deadline)
            })
            .await?
        }
        "aig" => on_conjunction(app, exchange, body, |f, _| Ok(normalform::aig(&f))).await?,
        _ => on_conjunction(app, exchange, body, |f, _| Ok(normalform::nnf(&f))).await?,
    };
    Ok(FormulaResult::single(converted.to_string()))
}
