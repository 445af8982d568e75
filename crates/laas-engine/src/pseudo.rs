// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pseudo-Boolean constraint normalization and exact expansion.

use std::collections::HashMap;

use crate::formula::{Comparator, Formula, Literal, Pbc};

/// `sum(coefficient * literal) <= rhs` with every coefficient positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtMost {
    pub terms: Vec<(i64, Literal)>,
    pub rhs: i64,
}

impl AtMost {
    /// Largest possible left-hand side.
    pub fn max_sum(&self) -> i64 {
        self.terms.iter().map(|(c, _)| *c).sum()
    }

    /// Cannot be satisfied.
    pub fn is_infeasible(&self) -> bool {
        self.rhs < 0
    }

    /// Satisfied by every assignment.
    pub fn is_trivial(&self) -> bool {
        self.max_sum() <= self.rhs
    }

    /// All coefficients are 1.
    pub fn is_cardinality(&self) -> bool {
        self.terms.iter().all(|(c, _)| *c == 1)
    }

    /// The literals of the constraint.
    pub fn literals(&self) -> Vec<Literal> {
        self.terms.iter().map(|(_, l)| l.clone()).collect()
    }
}

/// Rewrite a constraint as a conjunction of at-most constraints with
/// positive coefficients. `=` yields two of them.
pub fn normalize(pbc: &Pbc) -> Vec<AtMost> {
    let negated = || {
        pbc.terms
            .iter()
            .map(|(c, l)| (-c, l.clone()))
            .collect::<Vec<_>>()
    };
    let raw = match pbc.comparator {
        Comparator::Le => vec![(pbc.terms.clone(), pbc.rhs)],
        Comparator::Lt => vec![(pbc.terms.clone(), pbc.rhs - 1)],
        Comparator::Ge => vec![(negated(), -pbc.rhs)],
        Comparator::Gt => vec![(negated(), -pbc.rhs - 1)],
        Comparator::Eq => vec![(pbc.terms.clone(), pbc.rhs), (negated(), -pbc.rhs)],
    };
    raw.into_iter()
        .map(|(terms, rhs)| positive_coefficients(terms, rhs))
        .collect()
}

/// `c * l` with `c < 0` equals `c + |c| * ~l`.
fn positive_coefficients(terms: Vec<(i64, Literal)>, mut rhs: i64) -> AtMost {
    let mut out = Vec::with_capacity(terms.len());
    for (c, l) in terms {
        if c < 0 {
            rhs -= c;
            out.push((-c, l.negate()));
        } else if c > 0 {
            out.push((c, l));
        }
    }
    AtMost { terms: out, rhs }
}

/// Equivalent formula over the constraint's own variables only.
///
/// Built by decision on each literal with memoization on the remaining
/// bound; the result is in negation normal form.
pub fn expand(pbc: &Pbc) -> Formula {
    Formula::and(normalize(pbc).iter().map(expand_at_most))
}

fn expand_at_most(constraint: &AtMost) -> Formula {
    let mut terms = constraint.terms.clone();
    terms.sort_by(|a, b| b.0.cmp(&a.0));
    let mut suffix = vec![0; terms.len() + 1];
    for i in (0..terms.len()).rev() {
        suffix[i] = suffix[i + 1] + terms[i].0;
    }
    let mut memo = HashMap::new();
    expand_from(&terms, &suffix, 0, constraint.rhs, &mut memo)
}

fn expand_from(
    terms: &[(i64, Literal)],
    suffix: &[i64],
    i: usize,
    bound: i64,
    memo: &mut HashMap<(usize, i64), Formula>,
) -> Formula {
    if bound < 0 {
        return Formula::False;
    }
    if suffix[i] <= bound {
        return Formula::True;
    }
    if let Some(f) = memo.get(&(i, bound)) {
        return f.clone();
    }
    let (coefficient, literal) = &terms[i];
    let taken = expand_from(terms, suffix, i + 1, bound - coefficient, memo);
    let skipped = expand_from(terms, suffix, i + 1, bound, memo);
    // `taken` implies `skipped`, so ite(l, taken, skipped) = skipped & (~l | taken)
    let f = Formula::and([
        skipped,
        Formula::or([Formula::Lit(literal.negate()), taken]),
    ]);
    memo.insert((i, bound), f.clone());
    f
}
