// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Prime implicants and prime implicant covers.

use std::collections::HashMap;

use crate::clause::{AuxVars, RAIL_PREFIX};
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Literal};
use crate::maxsat::{self, MaxSatAlgorithm};
use crate::normalform::nnf;
use crate::sat::is_satisfiable;

/// Which models seed the implicants of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverAlgorithm {
    /// Models with as few true variables as possible.
    Min,
    /// Models with as many true variables as possible.
    Max,
}

/// A smallest set of literals whose conjunction implies `formula`, sorted
/// by variable name.
///
/// Every literal of the NNF gets its own rail variable; a cheapest
/// assignment of the rails that satisfies the rewritten NNF names the
/// implicant.
pub fn minimum_implicant(formula: &Formula, deadline: &Deadline) -> Result<Vec<Literal>> {
    let mut aux = AuxVars::new(RAIL_PREFIX);
    let mut rails: HashMap<Literal, Literal> = HashMap::new();
    let mut origin: HashMap<String, Literal> = HashMap::new();
    for name in formula.variables() {
        for phase in [true, false] {
            let literal = Literal::new(name.clone(), phase);
            let rail = aux.fresh();
            origin.insert(rail.name.clone(), literal.clone());
            rails.insert(literal, rail);
        }
    }
    let mut hard = vec![dual_rail(&nnf(formula), &rails)];
    for name in formula.variables() {
        let positive = &rails[&Literal::positive(name.clone())];
        let negative = &rails[&Literal::new(name, false)];
        hard.push(Formula::or([
            Formula::Lit(positive.negate()),
            Formula::Lit(negative.negate()),
        ]));
    }
    let soft: Vec<(Formula, i64)> = rails
        .values()
        .map(|rail| (Formula::Lit(rail.negate()), 1))
        .collect();
    let outcome = maxsat::solve(&hard, &soft, MaxSatAlgorithm::LinearSu, deadline)?;
    if !outcome.satisfiable {
        return Err(EngineError::rejected("formula is unsatisfiable"));
    }
    let mut implicant: Vec<Literal> = outcome
        .model
        .iter()
        .filter(|l| l.phase)
        .filter_map(|l| origin.get(&l.name).cloned())
        .collect();
    implicant.sort();
    Ok(implicant)
}

fn dual_rail(formula: &Formula, rails: &HashMap<Literal, Literal>) -> Formula {
    match formula {
        Formula::Lit(l) => Formula::Lit(rails[l].clone()),
        Formula::And(ops) => Formula::and(ops.iter().map(|op| dual_rail(op, rails))),
        Formula::Or(ops) => Formula::or(ops.iter().map(|op| dual_rail(op, rails))),
        other => other.clone(),
    }
}

/// Prime implicants whose disjunction is equivalent to `formula`. No
/// implicant is implied by the others. An unsatisfiable formula has the
/// empty cover.
pub fn cover(
    formula: &Formula,
    algorithm: CoverAlgorithm,
    deadline: &Deadline,
) -> Result<Vec<Vec<Literal>>> {
    let vars = formula.variables();
    let preference: Vec<(Formula, i64)> = vars
        .iter()
        .map(|name| {
            let literal = Literal::new(name.clone(), algorithm == CoverAlgorithm::Max);
            (Formula::Lit(literal), 1)
        })
        .collect();
    let negated = Formula::not(formula.clone());
    let mut hard = vec![formula.clone()];
    let mut implicants: Vec<Vec<Literal>> = Vec::new();
    loop {
        let outcome = maxsat::solve(&hard, &preference, MaxSatAlgorithm::LinearSu, deadline)?;
        if !outcome.satisfiable {
            break;
        }
        let mut implicant: Vec<Literal> = outcome
            .model
            .into_iter()
            .filter(|l| vars.contains(&l.name))
            .collect();
        let mut i = 0;
        while i < implicant.len() {
            let mut candidate = implicant.clone();
            candidate.remove(i);
            if implies_formula(&candidate, &negated, deadline)? {
                implicant = candidate;
            } else {
                i += 1;
            }
        }
        hard.push(Formula::or(implicant.iter().map(|l| Formula::Lit(l.negate()))));
        implicants.push(implicant);
    }
    irredundant(implicants, deadline)
}

/// `literals` imply the formula whose negation is `negated`.
fn implies_formula(literals: &[Literal], negated: &Formula, deadline: &Deadline) -> Result<bool> {
    let mut check: Vec<Formula> = literals.iter().cloned().map(Formula::Lit).collect();
    check.push(negated.clone());
    Ok(!is_satisfiable(&check, deadline)?)
}

fn irredundant(
    mut implicants: Vec<Vec<Literal>>,
    deadline: &Deadline,
) -> Result<Vec<Vec<Literal>>> {
    let mut i = implicants.len();
    while i > 0 {
        i -= 1;
        let others = Formula::or(
            implicants
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, term)| term_formula(term)),
        );
        if implies_formula(&implicants[i], &Formula::not(others), deadline)? {
            implicants.remove(i);
        }
    }
    Ok(implicants)
}

/// Conjunction of `literals`.
pub fn term_formula(literals: &[Literal]) -> Formula {
    Formula::and(literals.iter().cloned().map(Formula::Lit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::sat::equivalent;

    fn texts(terms: &[Vec<Literal>]) -> Vec<String> {
        terms.iter().map(|t| term_formula(t).to_string()).collect()
    }

    #[test]
    fn test_minimum_implicant() {
        let d = Deadline::unbounded();
        let f = parse("(A | B & C) & (A | D) & ~E").unwrap();
        let implicant = minimum_implicant(&f, &d).unwrap();
        assert_eq!(term_formula(&implicant).to_string(), "A & ~E");
        let f = parse("A & B | C").unwrap();
        assert_eq!(term_formula(&minimum_implicant(&f, &d).unwrap()).to_string(), "C");
    }

    #[test]
    fn test_unsatisfiable_has_no_implicant() {
        let f = parse("A & ~A | B & ~B").unwrap();
        let err = minimum_implicant(&f, &Deadline::unbounded()).unwrap_err();
        assert_eq!(err.to_string(), "formula is unsatisfiable");
    }

    #[test]
    fn test_cover_is_equivalent_and_prime() {
        let d = Deadline::unbounded();
        let f = parse("(A | B) & (~A | C) & (D => B)").unwrap();
        for algorithm in [CoverAlgorithm::Min, CoverAlgorithm::Max] {
            let terms = cover(&f, algorithm, &d).unwrap();
            let union = Formula::or(terms.iter().map(|t| term_formula(t)));
            assert!(equivalent(&f, &union, &d).unwrap(), "{algorithm:?}");
            let negated = Formula::not(f.clone());
            for term in &terms {
                for skip in 0..term.len() {
                    let mut shorter = term.clone();
                    shorter.remove(skip);
                    assert!(!implies_formula(&shorter, &negated, &d).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_cover_of_constants() {
        let d = Deadline::unbounded();
        assert_eq!(texts(&cover(&Formula::True, CoverAlgorithm::Max, &d).unwrap()), ["$true"]);
        assert!(cover(&Formula::False, CoverAlgorithm::Max, &d).unwrap().is_empty());
        let tautology = parse("A | ~A").unwrap();
        assert_eq!(texts(&cover(&tautology, CoverAlgorithm::Min, &d).unwrap()), ["$true"]);
    }
}
