// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP handlers, one module per computation family.
//!
//! Handlers decode the request through their [`Exchange`], move the decoded
//! input into a [`BoundedExecutor`] call and hand the outcome back to
//! [`Exchange::reply`]. Formula text is parsed inside the executor so that
//! parse failures and computations share one error path.
//!
//! Two input semantics exist. Most families parse every formula and work on
//! the conjunction ([`conjunction`]). Encodings, substitutions and
//! anonymization process each item on its own and zip the results back
//! against the inputs, keeping order and descriptions.

pub mod assignment;
pub mod encoding;
pub mod explanation;
pub mod formula;
pub mod graph;
pub mod model;
pub mod normalform;
pub mod prime;
pub mod randomizer;
pub mod simplification;
pub mod solver;
pub mod substitution;

use std::sync::Arc;

use axum::response::Response;
use laas_engine::{Deadline, Formula, Literal, parse_all};
use laas_protocol::{FormulaInput, FormulaItem};

use crate::config::Config;
use crate::envelope::Exchange;
use crate::error::Result;
use crate::executor::BoundedExecutor;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    executor: BoundedExecutor,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let executor = BoundedExecutor::new(config.sync_timeout);
        Self {
            config: Arc::new(config),
            executor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &BoundedExecutor {
        &self.executor
    }
}

/// Parse every item.
pub(crate) fn parse_items(items: &[FormulaItem]) -> laas_engine::Result<Vec<Formula>> {
    parse_all(items.iter().map(|item| item.formula.as_str()))
}

/// Parse every item and conjoin the formulas.
pub(crate) fn conjunction(items: &[FormulaItem]) -> laas_engine::Result<Formula> {
    Ok(Formula::and(parse_items(items)?))
}

pub(crate) fn literal_strings(literals: &[Literal]) -> Vec<String> {
    literals.iter().map(Literal::to_string).collect()
}

/// Decode a [`FormulaInput`] and run `compute` on the conjunction of its
/// formulas.
pub(crate) async fn on_conjunction<R, F>(
    app: &AppState,
    exchange: &Exchange,
    body: &[u8],
    compute: F,
) -> Result<R>
where
    F: FnOnce(Formula, &Deadline) -> laas_engine::Result<R> + Send + 'static,
    R: Send + 'static,
{
    let input: FormulaInput = exchange.decode(body)?;
    app.executor()
        .run(move |deadline| compute(conjunction(&input.formulas)?, deadline))
        .await
}

/// Decode a [`FormulaInput`] and run `compute` on every parsed item, in order.
pub(crate) async fn on_items<R, F>(
    app: &AppState,
    exchange: &Exchange,
    body: &[u8],
    compute: F,
) -> Result<R>
where
    F: FnOnce(Vec<FormulaItem>, Vec<Formula>, &Deadline) -> laas_engine::Result<R>
        + Send
        + 'static,
    R: Send + 'static,
{
    let input: FormulaInput = exchange.decode(body)?;
    app.executor()
        .run(move |deadline| {
            let formulas = parse_items(&input.formulas)?;
            compute(input.formulas, formulas, deadline)
        })
        .await
}

/// Answer a request for a path with no handler.
pub async fn unknown_path(exchange: Exchange) -> Response {
    exchange.fail(exchange.unknown_path())
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
