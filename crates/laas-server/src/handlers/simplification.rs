// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/simplification/{backbone|unitpropagation|subsumption|negation}`

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::simplification;
use laas_protocol::FormulaResult;

use super::{AppState, on_conjunction};
use crate::envelope::{Exchange, RequestBody};

pub async fn simplification(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(kind): Path<String>,
    body: RequestBody,
) -> Response {
    let (app, exchange, body) = (&app, &exchange, &body[..]);
    let outcome = match kind.as_str() {
        "backbone" => {
            on_conjunction(app, exchange, body, |f, deadline| {
                simplification::backbone_simplify(&f, deadline)
            })
            .await
        }
        "unitpropagation" => {
            on_conjunction(app, exchange, body, |f, deadline| {
                simplification::unit_propagation(&f, deadline)
            })
            .await
        }
        "subsumption" => {
            on_conjunction(app, exchange, body, |f, _| simplification::subsumption(&f)).await
        }
        "negation" => {
            on_conjunction(app, exchange, body, |f, _| {
                Ok(simplification::negation_simplify(&f))
            })
            .await
        }
        _ => return exchange.fail(exchange.unknown_path()),
    };
    exchange.reply(outcome.map(|f| FormulaResult::single(f.to_string())))
}
