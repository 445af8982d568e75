// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/substitution/anonymization` and `/substitution/variables`, both per item.

use axum::extract::State;
use axum::response::Response;
use laas_engine::parse;
use laas_engine::substitution::{Anonymizer, Substitution};
use laas_protocol::{FormulaResult, SubstitutionInput};

use super::{AppState, on_items, parse_items};
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

const DEFAULT_PREFIX: &str = "v";

/// Rename variables to `<prefix><n>`. Numbering is shared across the items
/// of one request.
pub async fn anonymization(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let prefix = exchange.param("prefix").unwrap_or(DEFAULT_PREFIX).to_owned();
    let outcome = on_items(&app, &exchange, &body, move |items, formulas, _| {
        let mut anonymizer = Anonymizer::new(prefix);
        Ok(FormulaResult::new(
            items
                .iter()
                .zip(&formulas)
                .map(|(item, formula)| item.with_formula(anonymizer.anonymize(formula).to_string()))
                .collect(),
        ))
    })
    .await;
    exchange.reply(outcome)
}

/// Replace variables by formulas.
pub async fn variables(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(substitute(&app, &exchange, &body).await)
}

async fn substitute(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<FormulaResult> {
    let input: SubstitutionInput = exchange.decode(body)?;
    app.executor()
        .run(move |_| {
            let mut substitution = Substitution::new();
            for (replace, with) in &input.substitution {
                substitution.insert(&parse(replace)?, parse(with)?)?;
            }
            let formulas = parse_items(&input.formulas)?;
            Ok(FormulaResult::new(
                input
                    .formulas
                    .iter()
                    .zip(&formulas)
                    .map(|(item, formula)| item.with_formula(substitution.apply(formula).to_string()))
                    .collect(),
            ))
        })
        .await
}
