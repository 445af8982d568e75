// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Exact model counting.

use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::deadline::Deadline;
use crate::dnnf::{branch_variable, cofactor, components};
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Literal};
use crate::sat::solver_for;

/// Model counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountAlgorithm {
    /// Component-caching Shannon expansion, as in DNNF compilation.
    Dnnf,
    /// Enumeration with blocking clauses.
    Sat,
    /// Path counting on the BDD.
    Bdd,
}

pub(crate) fn overflow() -> EngineError {
    EngineError::rejected("model count exceeds 128 bits")
}

/// Number of models over the variables of `formula`.
pub fn count(formula: &Formula, algorithm: CountAlgorithm, deadline: &Deadline) -> Result<u128> {
    match algorithm {
        CountAlgorithm::Dnnf => Counter::new(deadline).count(formula),
        CountAlgorithm::Sat => enumerate(formula, &formula.variables(), deadline),
        CountAlgorithm::Bdd => Bdd::compile(formula, deadline)?.model_count(),
    }
}

/// Number of assignments to `variables` that extend to a model. Variables
/// not occurring in the formula are free. [`CountAlgorithm::Dnnf`] is not a
/// projection strategy and is rejected.
pub fn count_projected(
    formula: &Formula,
    variables: &[String],
    algorithm: CountAlgorithm,
    deadline: &Deadline,
) -> Result<u128> {
    match algorithm {
        CountAlgorithm::Sat => enumerate(formula, variables, deadline),
        CountAlgorithm::Bdd => {
            let mut bdd = Bdd::compile(formula, deadline)?;
            bdd.project(variables)?;
            bdd.projected_count(variables)
        }
        CountAlgorithm::Dnnf => Err(EngineError::rejected(
            "projected counting does not support the dnnf algorithm",
        )),
    }
}

fn enumerate(formula: &Formula, projection: &[String], deadline: &Deadline) -> Result<u128> {
    let mut solver = solver_for(std::slice::from_ref(formula), deadline)?;
    for name in projection {
        solver.register(name);
    }
    let mut models: u128 = 0;
    while solver.sat()? {
        models = models.checked_add(1).ok_or_else(overflow)?;
        if projection.is_empty() {
            break;
        }
        let blocking: Vec<Literal> = solver
            .model_of(projection)
            .iter()
            .map(Literal::negate)
            .collect();
        solver.add_clause(&blocking);
    }
    Ok(models)
}

struct Counter<'a> {
    deadline: &'a Deadline,
    cache: HashMap<Formula, u128>,
}

impl<'a> Counter<'a> {
    fn new(deadline: &'a Deadline) -> Self {
        Self {
            deadline,
            cache: HashMap::new(),
        }
    }

    /// Models over the variables occurring in `formula`.
    fn count(&mut self, formula: &Formula) -> Result<u128> {
        self.deadline.check()?;
        match formula {
            Formula::True | Formula::Lit(_) => return Ok(1),
            Formula::False => return Ok(0),
            _ => {}
        }
        if let Some(&hit) = self.cache.get(formula) {
            return Ok(hit);
        }
        let parts = components(formula);
        let models = if parts.len() > 1 {
            let mut product: u128 = 1;
            for part in &parts {
                product = product.checked_mul(self.count(part)?).ok_or_else(overflow)?;
            }
            product
        } else if let Some(var) = branch_variable(formula) {
            let width = formula.variables().len();
            let mut sum: u128 = 0;
            for value in [true, false] {
                let rest = cofactor(formula, &var, value);
                // variables that vanished with the cofactor are free
                let free = width - 1 - rest.variables().len();
                let part = scale(self.count(&rest)?, free)?;
                sum = sum.checked_add(part).ok_or_else(overflow)?;
            }
            sum
        } else {
            1
        };
        self.cache.insert(formula.clone(), models);
        Ok(models)
    }
}

/// `count * 2^free`.
pub(crate) fn scale(count: u128, free: usize) -> Result<u128> {
    if count == 0 {
        return Ok(0);
    }
    let factor = u32::try_from(free)
        .ok()
        .and_then(|shift| 1u128.checked_shl(shift))
        .ok_or_else(overflow)?;
    count.checked_mul(factor).ok_or_else(overflow)
}
