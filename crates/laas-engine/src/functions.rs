// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural formula functions.

use std::collections::{BTreeMap, HashSet};

use crate::formula::Formula;

/// Height of the syntax tree. Atoms have depth 0.
pub fn depth(formula: &Formula) -> i64 {
    formula
        .operands()
        .into_iter()
        .map(|op| depth(op) + 1)
        .max()
        .unwrap_or(0)
}

/// Number of atom occurrences (constants, literals, PB constraints).
pub fn atoms(formula: &Formula) -> i64 {
    match formula {
        Formula::True | Formula::False | Formula::Lit(_) | Formula::Pbc(_) => 1,
        other => other.operands().into_iter().map(atoms).sum(),
    }
}

/// Number of nodes in the syntax tree.
pub fn nodes(formula: &Formula) -> i64 {
    1 + formula.operands().into_iter().map(nodes).sum::<i64>()
}

/// Variable names, sorted.
pub fn variables(formula: &Formula) -> Vec<String> {
    let mut vars = formula.variables();
    vars.sort();
    vars
}

/// Literals as text, sorted by variable then phase (negative first).
pub fn literals(formula: &Formula) -> Vec<String> {
    let mut lits = formula.literals();
    lits.sort();
    lits.into_iter().map(|l| l.to_string()).collect()
}

/// Distinct sub-formulas, operands before the formula containing them.
pub fn sub_formulas(formula: &Formula) -> Vec<Formula> {
    fn collect(f: &Formula, seen: &mut HashSet<Formula>, out: &mut Vec<Formula>) {
        for op in f.operands() {
            collect(op, seen, out);
        }
        if seen.insert(f.clone()) {
            out.push(f.clone());
        }
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect(formula, &mut seen, &mut out);
    out
}

/// Occurrences per variable.
pub fn variable_profile(formula: &Formula) -> BTreeMap<String, i64> {
    let mut profile = BTreeMap::new();
    formula.visit_literals(&mut |l| *profile.entry(l.name.clone()).or_insert(0) += 1);
    profile
}

/// Occurrences per literal.
pub fn literal_profile(formula: &Formula) -> BTreeMap<String, i64> {
    let mut profile = BTreeMap::new();
    formula.visit_literals(&mut |l| *profile.entry(l.to_string()).or_insert(0) += 1);
    profile
}
