// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Weighted partial MaxSAT by linear search over the cost.

use crate::assignment::eval_with;
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::{Comparator, Formula, Literal, Pbc};
use crate::sat::{Solver, solver_for, variables_of};

/// MaxSAT search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxSatAlgorithm {
    /// Tighten an upper bound from SAT until UNSAT.
    LinearSu,
    /// Raise a lower bound from UNSAT until SAT. Unweighted only.
    LinearUs,
}

impl MaxSatAlgorithm {
    fn name(self) -> &'static str {
        match self {
            MaxSatAlgorithm::LinearSu => "linear-su",
            MaxSatAlgorithm::LinearUs => "linear-us",
        }
    }
}

/// Result of a MaxSAT call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxSatOutcome {
    /// The hard formulas are satisfiable.
    pub satisfiable: bool,
    /// Total weight of falsified soft formulas in the optimum.
    pub optimum: i64,
    /// Variables sorted by name.
    pub model: Vec<Literal>,
}

impl MaxSatOutcome {
    fn unsatisfiable() -> Self {
        Self {
            satisfiable: false,
            optimum: 0,
            model: Vec::new(),
        }
    }
}

/// Minimize the weight of falsified `soft` formulas subject to `hard`.
pub fn solve(
    hard: &[Formula],
    soft: &[(Formula, i64)],
    algorithm: MaxSatAlgorithm,
    deadline: &Deadline,
) -> Result<MaxSatOutcome> {
    if algorithm == MaxSatAlgorithm::LinearUs && soft.iter().any(|(_, w)| *w != 1) {
        return Err(EngineError::rejected(format!(
            "algorithm '{}' does not support weighted instances",
            algorithm.name()
        )));
    }
    if !Pbc::in_range(soft.iter().map(|(_, w)| *w), 0) {
        return Err(EngineError::rejected(format!(
            "sum of soft formula weights exceeds {}",
            Pbc::MAX_MAGNITUDE
        )));
    }
    let mut all: Vec<Formula> = hard.to_vec();
    all.extend(soft.iter().map(|(f, _)| f.clone()));
    let mut vars = variables_of(&all);
    vars.sort();
    match algorithm {
        MaxSatAlgorithm::LinearSu => linear_su(hard, soft, &vars, deadline),
        MaxSatAlgorithm::LinearUs => linear_us(hard, soft, &vars, deadline),
    }
}

/// Hard formulas plus `soft_i | r_i` for every soft formula. Returns the
/// relaxation literals.
fn relaxed(
    hard: &[Formula],
    soft: &[(Formula, i64)],
    deadline: &Deadline,
) -> Result<(Solver, Vec<Literal>)> {
    let mut all: Vec<Formula> = hard.to_vec();
    all.extend(soft.iter().map(|(f, _)| f.clone()));
    let mut solver = Solver::new(deadline.clone());
    for name in variables_of(&all) {
        solver.register(&name);
    }
    for formula in hard {
        solver.add(formula)?;
    }
    let mut relax = Vec::with_capacity(soft.len());
    for (formula, _) in soft {
        let r = solver.fresh_selector();
        solver.add(&Formula::or([formula.clone(), Formula::Lit(r.clone())]))?;
        relax.push(r);
    }
    Ok((solver, relax))
}

fn cost_bound(relax: &[Literal], soft: &[(Formula, i64)], bound: i64) -> Formula {
    let terms = relax
        .iter()
        .zip(soft)
        .map(|(r, (_, w))| (*w, r.clone()))
        .collect();
    Formula::pbc(terms, Comparator::Le, bound)
}

fn model_cost(solver: &Solver, soft: &[(Formula, i64)]) -> i64 {
    let value = |name: &str| solver.value(name).unwrap_or(false);
    soft.iter()
        .filter(|(f, _)| !eval_with(f, &value))
        .map(|(_, w)| *w)
        .sum()
}

fn linear_su(
    hard: &[Formula],
    soft: &[(Formula, i64)],
    vars: &[String],
    deadline: &Deadline,
) -> Result<MaxSatOutcome> {
    let (mut solver, relax) = relaxed(hard, soft, deadline)?;
    if !solver.sat()? {
        return Ok(MaxSatOutcome::unsatisfiable());
    }
    let mut best = MaxSatOutcome {
        satisfiable: true,
        optimum: model_cost(&solver, soft),
        model: solver.model_of(vars),
    };
    while best.optimum > 0 {
        solver.add(&cost_bound(&relax, soft, best.optimum - 1))?;
        if !solver.sat()? {
            break;
        }
        let cost = model_cost(&solver, soft);
        tracing::trace!(cost, "improved maxsat bound");
        best.optimum = cost;
        best.model = solver.model_of(vars);
    }
    Ok(best)
}

fn linear_us(
    hard: &[Formula],
    soft: &[(Formula, i64)],
    vars: &[String],
    deadline: &Deadline,
) -> Result<MaxSatOutcome> {
    if !solver_for(hard, deadline)?.sat()? {
        return Ok(MaxSatOutcome::unsatisfiable());
    }
    for bound in 0..=soft.len() as i64 {
        let (mut solver, relax) = relaxed(hard, soft, deadline)?;
        solver.add(&cost_bound(&relax, soft, bound))?;
        if solver.sat()? {
            return Ok(MaxSatOutcome {
                satisfiable: true,
                optimum: model_cost(&solver, soft),
                model: solver.model_of(vars),
            });
        }
    }
    // falsifying every soft formula is always allowed
    Ok(MaxSatOutcome::unsatisfiable())
}
