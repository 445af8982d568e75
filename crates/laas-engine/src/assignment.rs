// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Evaluation and restriction under a (partial) assignment.

use std::collections::HashMap;

use crate::formula::{Formula, Literal, Pbc};

/// Variable to truth value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: HashMap<String, bool>,
}

impl Assignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(variable, value)` pairs. Later pairs win.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, bool)>) -> Self {
        let mut assignment = Self::new();
        for (name, value) in pairs {
            assignment.assign(name, value);
        }
        assignment
    }

    /// Build from literals: positive literals are true, negative false.
    pub fn from_literals<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> Self {
        Self::from_pairs(literals.into_iter().map(|l| (l.name.clone(), l.phase)))
    }

    /// Set a variable.
    pub fn assign(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    /// Value of a variable, if assigned.
    pub fn value(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluate a formula. Unassigned variables are false.
pub fn evaluate(formula: &Formula, assignment: &Assignment) -> bool {
    let value = |name: &str| assignment.value(name).unwrap_or(false);
    eval_with(formula, &value)
}

pub(crate) fn eval_with(formula: &Formula, value: &impl Fn(&str) -> bool) -> bool {
    match formula {
        Formula::True => true,
        Formula::False => false,
        Formula::Lit(l) => value(&l.name) == l.phase,
        Formula::Not(op) => !eval_with(op, value),
        Formula::Impl(l, r) => !eval_with(l, value) || eval_with(r, value),
        Formula::Equiv(l, r) => eval_with(l, value) == eval_with(r, value),
        Formula::And(ops) => ops.iter().all(|op| eval_with(op, value)),
        Formula::Or(ops) => ops.iter().any(|op| eval_with(op, value)),
        Formula::Pbc(pbc) => pbc.comparator.holds(pbc.lhs(value), pbc.rhs),
    }
}

/// Replace assigned variables by constants and simplify.
pub fn restrict(formula: &Formula, assignment: &Assignment) -> Formula {
    match formula {
        Formula::True | Formula::False => formula.clone(),
        Formula::Lit(l) => match assignment.value(&l.name) {
            Some(v) => Formula::constant(v == l.phase),
            None => formula.clone(),
        },
        Formula::Not(op) => Formula::not(restrict(op, assignment)),
        Formula::Impl(l, r) => {
            Formula::implication(restrict(l, assignment), restrict(r, assignment))
        }
        Formula::Equiv(l, r) => {
            Formula::equivalence(restrict(l, assignment), restrict(r, assignment))
        }
        Formula::And(ops) => Formula::and(ops.iter().map(|op| restrict(op, assignment))),
        Formula::Or(ops) => Formula::or(ops.iter().map(|op| restrict(op, assignment))),
        Formula::Pbc(pbc) => restrict_pbc(pbc, assignment),
    }
}

fn restrict_pbc(pbc: &Pbc, assignment: &Assignment) -> Formula {
    let mut fixed = 0;
    let mut open = Vec::new();
    for (coefficient, literal) in &pbc.terms {
        match assignment.value(&literal.name) {
            Some(v) if v == literal.phase => fixed += coefficient,
            Some(_) => {}
            None => open.push((*coefficient, literal.clone())),
        }
    }
    Formula::pbc(open, pbc.comparator, pbc.rhs - fixed)
}
