// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Clause sets and auxiliary variable allocation.

use std::collections::HashSet;

use crate::formula::{Formula, Literal};

/// A disjunction (in CNF) or conjunction (in DNF) of literals.
pub type Clause = Vec<Literal>;

/// Prefix of auxiliary variables introduced by CNF transformations.
pub const CNF_PREFIX: &str = "@RESERVED_CNF_";
/// Prefix of auxiliary variables introduced by cardinality encodings.
pub const CC_PREFIX: &str = "@RESERVED_CC_";
/// Prefix of auxiliary variables introduced by pseudo-Boolean encodings.
pub const PB_PREFIX: &str = "@RESERVED_PBC_";
/// Prefix of selector and relaxation variables used inside the solvers.
pub const SEL_PREFIX: &str = "@RESERVED_SEL_";
/// Prefix of the hitting set variables of the smallest MUS search.
pub const HS_PREFIX: &str = "@RESERVED_HS_";
/// Prefix of the dual-rail variables of prime implicant computation.
pub const RAIL_PREFIX: &str = "@RESERVED_RAIL_";

/// Generator of fresh auxiliary variables `<prefix><n>`.
#[derive(Debug, Clone)]
pub struct AuxVars {
    prefix: &'static str,
    next: usize,
}

impl AuxVars {
    /// Numbering starts at 0.
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    /// A new positive literal.
    pub fn fresh(&mut self) -> Literal {
        let literal = Literal::positive(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        literal
    }

    /// `n` new positive literals.
    pub fn fresh_n(&mut self, n: usize) -> Vec<Literal> {
        (0..n).map(|_| self.fresh()).collect()
    }

    /// True if `name` was produced by any generator.
    pub fn is_aux(name: &str) -> bool {
        [CNF_PREFIX, CC_PREFIX, PB_PREFIX, SEL_PREFIX, HS_PREFIX, RAIL_PREFIX]
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }
}

/// Union of two clauses without duplicates. `None` if the result contains
/// complementary literals.
pub fn merge(a: &[Literal], b: &[Literal]) -> Option<Clause> {
    let mut out: Clause = a.to_vec();
    for literal in b {
        if out.contains(&literal.negate()) {
            return None;
        }
        if !out.contains(literal) {
            out.push(literal.clone());
        }
    }
    Some(out)
}

/// Drop duplicate clauses and clauses that are supersets of another one.
/// The order of survivors is kept.
pub fn remove_subsumed(clauses: Vec<Clause>) -> Vec<Clause> {
    let keep = {
        let sets: Vec<HashSet<&Literal>> = clauses.iter().map(|c| c.iter().collect()).collect();
        let mut keep = vec![true; clauses.len()];
        for i in 0..sets.len() {
            for j in 0..sets.len() {
                if i == j || !keep[j] {
                    continue;
                }
                // equal sets: keep the first
                if sets[j].is_subset(&sets[i]) && (sets[j].len() < sets[i].len() || j < i) {
                    keep[i] = false;
                    break;
                }
            }
        }
        keep
    };
    clauses
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

/// Conjunction of disjunctions.
pub fn cnf_formula(clauses: &[Clause]) -> Formula {
    Formula::and(clauses.iter().map(|c| Formula::clause(c.iter().cloned())))
}

/// Disjunction of conjunctions.
pub fn dnf_formula(terms: &[Clause]) -> Formula {
    Formula::or(
        terms
            .iter()
            .map(|t| Formula::and(t.iter().cloned().map(Formula::Lit))),
    )
}

/// Literals of a clause-shaped formula (a literal or a disjunction of
/// literals), `None` otherwise.
pub fn as_clause(formula: &Formula) -> Option<Clause> {
    literal_list(formula, false)
}

/// Literals of a term-shaped formula (a literal or a conjunction of
/// literals), `None` otherwise.
pub fn as_term(formula: &Formula) -> Option<Clause> {
    literal_list(formula, true)
}

fn literal_list(formula: &Formula, conjunctive: bool) -> Option<Clause> {
    match formula {
        Formula::Lit(l) => Some(vec![l.clone()]),
        Formula::And(ops) if conjunctive => ops.iter().map(as_literal).collect(),
        Formula::Or(ops) if !conjunctive => ops.iter().map(as_literal).collect(),
        _ => None,
    }
}

fn as_literal(formula: &Formula) -> Option<Literal> {
    match formula {
        Formula::Lit(l) => Some(l.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Literal {
        match text.strip_prefix('~') {
            Some(name) => Literal::new(name, false),
            None => Literal::positive(text),
        }
    }

    fn clause(texts: &[&str]) -> Clause {
        texts.iter().map(|t| lit(t)).collect()
    }

    #[test]
    fn test_aux_vars_are_numbered() {
        let mut aux = AuxVars::new(CC_PREFIX);
        assert_eq!(aux.fresh().name, "@RESERVED_CC_0");
        assert_eq!(aux.fresh_n(2)[1].name, "@RESERVED_CC_2");
        assert!(AuxVars::is_aux("@RESERVED_CC_2"));
        assert!(!AuxVars::is_aux("A"));
    }

    #[test]
    fn test_merge() {
        assert_eq!(
            merge(&clause(&["A", "B"]), &clause(&["B", "C"])),
            Some(clause(&["A", "B", "C"]))
        );
        assert_eq!(merge(&clause(&["A"]), &clause(&["~A"])), None);
    }

    #[test]
    fn test_remove_subsumed() {
        let clauses = vec![
            clause(&["A", "B", "C"]),
            clause(&["A", "B"]),
            clause(&["D"]),
            clause(&["B", "A"]),
            clause(&["D", "E"]),
        ];
        assert_eq!(
            remove_subsumed(clauses),
            vec![clause(&["A", "B"]), clause(&["D"])]
        );
    }

    #[test]
    fn test_as_clause_and_term() {
        let or = Formula::or([Formula::var("A"), Formula::lit("B", false)]);
        assert_eq!(as_clause(&or), Some(clause(&["A", "~B"])));
        assert_eq!(as_term(&or), None);
        assert_eq!(as_term(&Formula::var("A")), Some(clause(&["A"])));
    }
}
