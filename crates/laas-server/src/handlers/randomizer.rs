// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `GET /randomizer/{sort}`
//!
//! | Parameter | Default | Maximum |
//! |-----------|---------|---------|
//! | `seed` | current time in milliseconds | |
//! | `vars` | 25 | 100000 |
//! | `depth` | 3 | 32 |
//! | `formulas` | 1 | 10000 |

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::response::Response;
use laas_engine::{Formula, Randomizer};
use laas_protocol::{FormulaItem, FormulaResult};

use super::AppState;
use crate::dispatch::number;
use crate::envelope::Exchange;
use crate::error::{Result, ServiceError};

const DEFAULT_VARS: usize = 25;
const DEFAULT_DEPTH: usize = 3;
const DEFAULT_FORMULAS: usize = 1;
const MAX_VARS: usize = 100_000;
const MAX_DEPTH: usize = 32;
const MAX_FORMULAS: usize = 10_000;

/// Formula sorts the randomizer can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sort {
    Constant,
    Variable,
    Literal,
    Atom,
    Not,
    Implication,
    Equivalence,
    And,
    Or,
    Cc,
    Amo,
    Exo,
    Pbc,
    Formula,
}

impl Sort {
    fn from_path(segment: &str) -> Option<Self> {
        Some(match segment {
            "const" => Sort::Constant,
            "var" => Sort::Variable,
            "lit" => Sort::Literal,
            "atom" => Sort::Atom,
            "not" => Sort::Not,
            "impl" => Sort::Implication,
            "equiv" => Sort::Equivalence,
            "and" => Sort::And,
            "or" => Sort::Or,
            "cc" => Sort::Cc,
            "amo" => Sort::Amo,
            "exo" => Sort::Exo,
            "pbc" => Sort::Pbc,
            "formula" => Sort::Formula,
            _ => return None,
        })
    }

    fn generate(self, randomizer: &mut Randomizer, depth: usize) -> laas_engine::Result<Formula> {
        Ok(match self {
            Sort::Constant => randomizer.constant(),
            Sort::Variable => randomizer.variable(),
            Sort::Literal => randomizer.literal(),
            Sort::Atom => randomizer.atom(),
            Sort::Not => randomizer.not(depth)?,
            Sort::Implication => randomizer.implication(depth)?,
            Sort::Equivalence => randomizer.equivalence(depth)?,
            Sort::And => randomizer.and(depth)?,
            Sort::Or => randomizer.or(depth)?,
            Sort::Cc => randomizer.cc(),
            Sort::Amo => randomizer.amo(),
            Sort::Exo => randomizer.exo(),
            Sort::Pbc => randomizer.pbc(),
            Sort::Formula => randomizer.formula(depth)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Parameters {
    seed: u64,
    vars: usize,
    depth: usize,
    formulas: usize,
}

impl Parameters {
    fn from_exchange(exchange: &Exchange) -> Result<Self> {
        let vars = number("vars", exchange.param("vars"), DEFAULT_VARS)?;
        if vars == 0 {
            return Err(ServiceError::illegal_input("illegal vars value '0'"));
        }
        Ok(Self {
            seed: number("seed", exchange.param("seed"), default_seed())?,
            vars: at_most("vars", vars, MAX_VARS)?,
            depth: at_most(
                "depth",
                number("depth", exchange.param("depth"), DEFAULT_DEPTH)?,
                MAX_DEPTH,
            )?,
            formulas: at_most(
                "formulas",
                number("formulas", exchange.param("formulas"), DEFAULT_FORMULAS)?,
                MAX_FORMULAS,
            )?,
        })
    }
}

fn at_most(name: &str, value: usize, max: usize) -> Result<usize> {
    if value > max {
        return Err(ServiceError::illegal_input(format!(
            "illegal {name} value '{value}', at most {max} is supported"
        )));
    }
    Ok(value)
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

pub async fn randomizer(
    State(app): State<AppState>,
    exchange: Exchange,
    Path(sort): Path<String>,
) -> Response {
    match Sort::from_path(&sort) {
        Some(sort) => exchange.reply(generate(&app, &exchange, sort).await),
        None => exchange.fail(exchange.unknown_path()),
    }
}

async fn generate(app: &AppState, exchange: &Exchange, sort: Sort) -> Result<FormulaResult> {
    let params = Parameters::from_exchange(exchange)?;
    app.executor()
        .run(move |deadline| {
            let mut randomizer = Randomizer::new(params.seed, params.vars, deadline.clone());
            let mut formulas = Vec::with_capacity(params.formulas);
            for _ in 0..params.formulas {
                deadline.check()?;
                let formula = sort.generate(&mut randomizer, params.depth)?;
                formulas.push(FormulaItem::new(formula.to_string()));
            }
            Ok(FormulaResult::new(formulas))
        })
        .await
}
