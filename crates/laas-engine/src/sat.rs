// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! DPLL SAT solver and the solver-backed queries built on it.
//!
//! Formulas are clausified with the Plaisted-Greenbaum encoding; PB
//! constraints are encoded directly. The search branches on the lowest
//! unassigned variable, trying `false` first, and backtracks
//! chronologically.

use std::collections::{HashMap, HashSet};

use crate::clause::SEL_PREFIX;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::explanation::{MusAlgorithm, mus};
use crate::formula::{Formula, Literal};
use crate::normalform::Clausifier;

/// Solver literal: variable index and phase packed into one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Lit(u32);

impl Lit {
    fn new(var: usize, phase: bool) -> Self {
        Lit(((var as u32) << 1) | u32::from(!phase))
    }

    fn var(self) -> usize {
        (self.0 >> 1) as usize
    }

    fn phase(self) -> bool {
        self.0 & 1 == 0
    }
}

/// Incremental clause store with a DPLL search.
pub struct Solver {
    deadline: Deadline,
    clausifier: Clausifier,
    names: Vec<String>,
    index: HashMap<String, usize>,
    clauses: Vec<Vec<Lit>>,
    has_empty_clause: bool,
    selectors: usize,
    model: Vec<bool>,
}

impl Solver {
    /// Empty solver observing `deadline`.
    pub fn new(deadline: Deadline) -> Self {
        Self {
            deadline,
            clausifier: Clausifier::new(false),
            names: Vec::new(),
            index: HashMap::new(),
            clauses: Vec::new(),
            has_empty_clause: false,
            selectors: 0,
            model: Vec::new(),
        }
    }

    /// Make a variable known so that it takes part in the search.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(&var) = self.index.get(name) {
            return var;
        }
        let var = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), var);
        var
    }

    /// Add a formula.
    pub fn add(&mut self, formula: &Formula) -> Result<()> {
        for name in formula.variables() {
            self.register(&name);
        }
        self.clausifier.add(formula, &self.deadline)?;
        for clause in self.clausifier.take_clauses() {
            self.add_clause(&clause);
        }
        Ok(())
    }

    /// Add a clause. Tautologies are dropped, duplicate literals merged.
    pub fn add_clause(&mut self, clause: &[Literal]) {
        let mut lits: Vec<Lit> = Vec::with_capacity(clause.len());
        for literal in clause {
            let lit = Lit::new(self.register(&literal.name), literal.phase);
            if lits.contains(&Lit::new(lit.var(), !lit.phase())) {
                return;
            }
            if !lits.contains(&lit) {
                lits.push(lit);
            }
        }
        if lits.is_empty() {
            self.has_empty_clause = true;
        }
        self.clauses.push(lits);
    }

    /// A fresh internal variable that never shows up in models.
    pub fn fresh_selector(&mut self) -> Literal {
        let literal = Literal::positive(format!("{SEL_PREFIX}{}", self.selectors));
        self.selectors += 1;
        self.register(&literal.name);
        literal
    }

    /// Satisfiability of the clauses added so far.
    pub fn sat(&mut self) -> Result<bool> {
        self.sat_with(&[])
    }

    /// Satisfiability under assumed literals.
    pub fn sat_with(&mut self, assumptions: &[Literal]) -> Result<bool> {
        let assumptions: Vec<Lit> = assumptions
            .iter()
            .map(|l| Lit::new(self.register(&l.name), l.phase))
            .collect();
        self.search(&assumptions)
    }

    /// Value of a variable in the last model.
    pub fn value(&self, name: &str) -> Option<bool> {
        self.index.get(name).and_then(|&var| self.model.get(var).copied())
    }

    /// Literals of `variables` in the last model. Unknown variables are false.
    pub fn model_of(&self, variables: &[String]) -> Vec<Literal> {
        variables
            .iter()
            .map(|name| Literal::new(name.clone(), self.value(name).unwrap_or(false)))
            .collect()
    }

    fn search(&mut self, assumptions: &[Lit]) -> Result<bool> {
        if self.has_empty_clause {
            return Ok(false);
        }
        let n = self.names.len();
        let mut values: Vec<Option<bool>> = vec![None; n];
        let mut trail: Vec<usize> = Vec::new();
        // (trail length before the decision, variable, second branch taken)
        let mut decisions: Vec<(usize, usize, bool)> = Vec::new();
        for &a in assumptions {
            match values[a.var()] {
                Some(v) if v != a.phase() => return Ok(false),
                Some(_) => {}
                None => {
                    values[a.var()] = Some(a.phase());
                    trail.push(a.var());
                }
            }
        }
        loop {
            if self.propagate(&mut values, &mut trail)? {
                match values.iter().position(Option::is_none) {
                    None => {
                        self.model = values.iter().map(|v| v.unwrap_or(false)).collect();
                        return Ok(true);
                    }
                    Some(var) => {
                        decisions.push((trail.len(), var, false));
                        values[var] = Some(false);
                        trail.push(var);
                    }
                }
                continue;
            }
            loop {
                let Some((mark, var, flipped)) = decisions.pop() else {
                    return Ok(false);
                };
                for v in trail.drain(mark..) {
                    values[v] = None;
                }
                if !flipped {
                    decisions.push((mark, var, true));
                    values[var] = Some(true);
                    trail.push(var);
                    break;
                }
            }
        }
    }

    /// Unit propagation to a fixpoint. `false` on a conflict.
    fn propagate(&self, values: &mut [Option<bool>], trail: &mut Vec<usize>) -> Result<bool> {
        loop {
            self.deadline.check()?;
            let mut changed = false;
            for clause in &self.clauses {
                let mut open = 0;
                let mut last_open = None;
                let mut satisfied = false;
                for &lit in clause {
                    match values[lit.var()] {
                        Some(v) if v == lit.phase() => {
                            satisfied = true;
                            break;
                        }
                        Some(_) => {}
                        None => {
                            open += 1;
                            last_open = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (open, last_open) {
                    (0, _) => return Ok(false),
                    (1, Some(lit)) => {
                        values[lit.var()] = Some(lit.phase());
                        trail.push(lit.var());
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return Ok(true);
            }
        }
    }
}

/// Result of a SAT call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatOutcome {
    pub satisfiable: bool,
    /// Input variables sorted by name, empty when unsatisfiable.
    pub model: Vec<Literal>,
    /// Indices of a minimal unsatisfiable subset, if requested.
    pub core: Vec<usize>,
}

/// Variables of all formulas in order of first occurrence.
pub(crate) fn variables_of(formulas: &[Formula]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for formula in formulas {
        for name in formula.variables() {
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
    }
    out
}

/// Solver loaded with the given formulas, input variables registered first.
pub(crate) fn solver_for(formulas: &[Formula], deadline: &Deadline) -> Result<Solver> {
    let mut solver = Solver::new(deadline.clone());
    for name in variables_of(formulas) {
        solver.register(&name);
    }
    for formula in formulas {
        solver.add(formula)?;
    }
    Ok(solver)
}

/// Satisfiability of the conjunction of `formulas`.
pub fn solve(formulas: &[Formula], with_core: bool, deadline: &Deadline) -> Result<SatOutcome> {
    let mut solver = solver_for(formulas, deadline)?;
    if solver.sat()? {
        let mut vars = variables_of(formulas);
        vars.sort();
        return Ok(SatOutcome {
            satisfiable: true,
            model: solver.model_of(&vars),
            core: Vec::new(),
        });
    }
    let core = if with_core {
        mus(formulas, MusAlgorithm::Deletion, deadline)?
    } else {
        Vec::new()
    };
    Ok(SatOutcome {
        satisfiable: false,
        model: Vec::new(),
        core,
    })
}

/// Satisfiability only.
pub fn is_satisfiable(formulas: &[Formula], deadline: &Deadline) -> Result<bool> {
    solver_for(formulas, deadline)?.sat()
}

/// Backbone of a formula set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backbone {
    pub satisfiable: bool,
    /// True in every model.
    pub positive: Vec<String>,
    /// False in every model.
    pub negative: Vec<String>,
    /// Neither.
    pub optional: Vec<String>,
}

impl Backbone {
    /// Backbone literals in variable order of `order`.
    pub fn literals(&self, order: &[String]) -> Vec<Literal> {
        order
            .iter()
            .filter_map(|name| {
                if self.positive.contains(name) {
                    Some(Literal::positive(name.clone()))
                } else if self.negative.contains(name) {
                    Some(Literal::new(name.clone(), false))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Compute the backbone. Each list is sorted by name.
pub fn backbone(formulas: &[Formula], deadline: &Deadline) -> Result<Backbone> {
    let mut solver = solver_for(formulas, deadline)?;
    if !solver.sat()? {
        return Ok(Backbone::default());
    }
    let mut vars = variables_of(formulas);
    vars.sort();
    let mut candidates: Vec<Option<bool>> = vars.iter().map(|v| solver.value(v)).collect();
    let mut result = Backbone {
        satisfiable: true,
        ..Backbone::default()
    };
    for (i, name) in vars.iter().enumerate() {
        let Some(value) = candidates[i] else {
            result.optional.push(name.clone());
            continue;
        };
        if solver.sat_with(&[Literal::new(name.clone(), !value)])? {
            result.optional.push(name.clone());
            // any variable flipped by the new model is optional as well
            for (j, other) in vars.iter().enumerate().skip(i + 1) {
                if candidates[j].is_some() && candidates[j] != solver.value(other) {
                    candidates[j] = None;
                }
            }
        } else if value {
            result.positive.push(name.clone());
        } else {
            result.negative.push(name.clone());
        }
    }
    Ok(result)
}

/// Valid: the negation is unsatisfiable.
pub fn is_tautology(formula: &Formula, deadline: &Deadline) -> Result<bool> {
    Ok(!is_satisfiable(&[Formula::not(formula.clone())], deadline)?)
}

/// Unsatisfiable.
pub fn is_contradiction(formula: &Formula, deadline: &Deadline) -> Result<bool> {
    Ok(!is_satisfiable(std::slice::from_ref(formula), deadline)?)
}

/// `left` entails `right`.
pub fn implies(left: &Formula, right: &Formula, deadline: &Deadline) -> Result<bool> {
    let counter = [left.clone(), Formula::not(right.clone())];
    Ok(!is_satisfiable(&counter, deadline)?)
}

/// Same models.
pub fn equivalent(left: &Formula, right: &Formula, deadline: &Deadline) -> Result<bool> {
    Ok(implies(left, right, deadline)? && implies(right, left, deadline)?)
}
