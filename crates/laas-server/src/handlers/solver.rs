// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/solver/...`: SAT, MaxSAT, backbones and semantic predicates.

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::{Formula, maxsat, parse, sat};
use laas_protocol::{BackboneResult, BoolResult, FormulaInput, MaxSatInput, MaxSatResult, SatResult};

use super::{AppState, literal_strings, on_items, parse_items};
use crate::dispatch::{MAXSAT, flag};
use crate::envelope::{Exchange, RequestBody};
use crate::error::{Result, ServiceError};

/// `/solver/sat`. With `core=true` an unsatisfiable answer carries a
/// minimal unsatisfiable subset of the input items.
pub async fn sat(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(solve(&app, &exchange, &body).await)
}

/// `/solver/maxsat`
pub async fn maxsat(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(optimize(&app, &exchange, &body).await)
}

/// `/solver/backbone`
pub async fn backbone(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_items(&app, &exchange, &body, |_, formulas, deadline| {
        let backbone = sat::backbone(&formulas, deadline)?;
        Ok(BackboneResult::new(
            backbone.satisfiable,
            backbone.positive,
            backbone.negative,
            backbone.optional,
        ))
    })
    .await;
    exchange.reply(outcome)
}

/// `/solver/predicate/{tautology|contradiction|implication|equivalence}`
pub async fn predicate(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(predicate): Path<String>,
    body: RequestBody,
) -> Response {
    match predicate.as_str() {
        "tautology" | "contradiction" | "implication" | "equivalence" => {
            exchange.reply(decide(&app, &exchange, &body, &predicate).await)
        }
        _ => exchange.fail(exchange.unknown_path()),
    }
}

async fn solve(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<SatResult> {
    let with_core = flag("core", exchange.param("core"))?;
    on_items(app, exchange, body, move |items, formulas, deadline| {
        let outcome = sat::solve(&formulas, with_core, deadline)?;
        if outcome.satisfiable {
            return Ok(SatResult::satisfiable(literal_strings(&outcome.model)));
        }
        Ok(SatResult::unsatisfiable(
            outcome.core.into_iter().map(|i| items[i].clone()).collect(),
        ))
    })
    .await
}

async fn optimize(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<MaxSatResult> {
    let algorithm = MAXSAT.resolve(exchange.param(MAXSAT.parameter()))?;
    let input: MaxSatInput = exchange.decode(body)?;
    app.executor()
        .run(move |deadline| {
            let hard = parse_items(&input.hard_formulas)?;
            let soft = input
                .soft_formulas
                .iter()
                .map(|(text, weight)| parse(text).map(|formula| (formula, *weight)))
                .collect::<laas_engine::Result<Vec<_>>>()?;
            let outcome = maxsat::solve(&hard, &soft, algorithm, deadline)?;
            Ok(MaxSatResult::new(
                outcome.satisfiable,
                outcome.optimum,
                literal_strings(&outcome.model),
            ))
        })
        .await
}

async fn decide(
    app: &AppState,
    exchange: &Exchange,
    body: &[u8],
    predicate: &str,
) -> Result<BoolResult> {
    let input: FormulaInput = exchange.decode(body)?;
    let binary = matches!(predicate, "implication" | "equivalence");
    if binary && input.formulas.len() != 2 {
        return Err(ServiceError::illegal_input(format!(
            "{predicate} needs exactly two formulas"
        )));
    }
    let predicate = predicate.to_owned();
    app.executor()
        .run(move |deadline| {
            let formulas = parse_items(&input.formulas)?;
            let holds = match (predicate.as_str(), formulas.as_slice()) {
                ("implication", [left, right]) => sat::implies(left, right, deadline)?,
                ("equivalence", [left, right]) => sat::equivalent(left, right, deadline)?,
                ("contradiction", all) => {
                    sat::is_contradiction(&Formula::and(all.iter().cloned()), deadline)?
                }
                (_, all) => sat::is_tautology(&Formula::and(all.iter().cloned()), deadline)?,
            };
            Ok(BoolResult::new(holds))
        })
        .await
}
