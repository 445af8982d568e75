// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Formula simplifications.

use std::collections::HashMap;

use crate::assignment::{Assignment, restrict};
use crate::clause::{Clause, as_clause, as_term, cnf_formula, dnf_formula, remove_subsumed};
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Literal};
use crate::normalform::{CnfAlgorithm, cnf_clauses, is_cnf, is_dnf, nnf_with_pbc};
use crate::sat::backbone;

/// Conjunction of the backbone literals and the formula restricted by them.
/// `$false` if the formula is unsatisfiable.
pub fn backbone_simplify(formula: &Formula, deadline: &Deadline) -> Result<Formula> {
    let backbone = backbone(std::slice::from_ref(formula), deadline)?;
    if !backbone.satisfiable {
        return Ok(Formula::False);
    }
    let literals = backbone.literals(&formula.variables());
    let restricted = restrict(formula, &Assignment::from_literals(&literals));
    Ok(Formula::and(
        literals.into_iter().map(Formula::Lit).chain([restricted]),
    ))
}

/// Unit propagation on the CNF. Remaining clauses come first, followed by
/// the propagated units.
pub fn unit_propagation(formula: &Formula, deadline: &Deadline) -> Result<Formula> {
    let mut clauses = cnf_clauses(formula, CnfAlgorithm::Advanced, deadline)?;
    let mut values: HashMap<String, bool> = HashMap::new();
    let mut units: Vec<Literal> = Vec::new();
    loop {
        deadline.check()?;
        let mut changed = false;
        let mut next: Vec<Clause> = Vec::with_capacity(clauses.len());
        for clause in clauses {
            if clause.iter().any(|l| values.get(&l.name) == Some(&l.phase)) {
                continue;
            }
            let open: Clause = clause
                .into_iter()
                .filter(|l| !values.contains_key(&l.name))
                .collect();
            match open.as_slice() {
                [] => return Ok(Formula::False),
                [unit] => {
                    values.insert(unit.name.clone(), unit.phase);
                    units.push(unit.clone());
                    changed = true;
                }
                _ => next.push(open),
            }
        }
        clauses = next;
        if !changed {
            break;
        }
    }
    Ok(Formula::and([
        cnf_formula(&clauses),
        Formula::and(units.into_iter().map(Formula::Lit)),
    ]))
}

/// Remove subsumed clauses of a CNF or subsumed terms of a DNF.
pub fn subsumption(formula: &Formula) -> Result<Formula> {
    if formula.is_constant() {
        return Ok(formula.clone());
    }
    if is_cnf(formula) {
        let clauses = split(formula, |f| matches!(f, Formula::And(_)), as_clause);
        return Ok(cnf_formula(&remove_subsumed(clauses)));
    }
    if is_dnf(formula) {
        let terms = split(formula, |f| matches!(f, Formula::Or(_)), as_term);
        return Ok(dnf_formula(&remove_subsumed(terms)));
    }
    Err(EngineError::rejected("input for subsumption must be in CNF or DNF"))
}

fn split(
    formula: &Formula,
    is_outer: impl Fn(&Formula) -> bool,
    inner: impl Fn(&Formula) -> Option<Clause>,
) -> Vec<Clause> {
    if is_outer(formula) {
        formula.operands().into_iter().filter_map(inner).collect()
    } else {
        inner(formula).into_iter().collect()
    }
}

/// Pick, bottom-up, whichever of `g` and `~nnf(~g)` prints shorter.
pub fn negation_simplify(formula: &Formula) -> Formula {
    let rebuilt = match formula {
        Formula::Not(op) => Formula::not(negation_simplify(op)),
        Formula::Impl(a, b) => Formula::implication(negation_simplify(a), negation_simplify(b)),
        Formula::Equiv(a, b) => Formula::equivalence(negation_simplify(a), negation_simplify(b)),
        Formula::And(ops) => Formula::and(ops.iter().map(negation_simplify)),
        Formula::Or(ops) => Formula::or(ops.iter().map(negation_simplify)),
        other => return other.clone(),
    };
    let negated = Formula::not(nnf_with_pbc(&Formula::not(rebuilt.clone())));
    if negated.to_string().len() < rebuilt.to_string().len() {
        negated
    } else {
        rebuilt
    }
}
