// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Normal form transformations and predicates.
//!
//! Every transformation first moves negations to the literals (NNF).
//! Pseudo-Boolean constraints are expanded into plain formulas on the way,
//! except inside the solver where [`Clausifier`] encodes them directly.

use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::clause::{
    AuxVars, CNF_PREFIX, Clause, PB_PREFIX, as_clause, as_term, cnf_formula, dnf_formula, merge,
    remove_subsumed,
};
use crate::deadline::Deadline;
use crate::encoding::pbc_clauses;
use crate::error::Result;
use crate::formula::{Comparator, Formula, Literal, Pbc};
use crate::pseudo::expand;

/// Clause budget of the advanced CNF transformation per top-level operand.
pub const ADVANCED_CLAUSE_BUDGET: usize = 1000;

/// CNF transformation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnfAlgorithm {
    /// Factorization with subsumption; operands exceeding
    /// [`ADVANCED_CLAUSE_BUDGET`] clauses are encoded by Plaisted-Greenbaum.
    Advanced,
    Factorization,
    Tseitin,
    Pg,
    Canonical,
    /// One clause per path to the false terminal of the BDD.
    Bdd,
}

/// DNF transformation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnfAlgorithm {
    Factorization,
    Canonical,
    /// One term per path to the true terminal of the BDD.
    Bdd,
}

/// Negation normal form. PB constraints are expanded.
pub fn nnf(formula: &Formula) -> Formula {
    to_nnf(formula, true, true)
}

/// Negation normal form keeping PB constraints as atoms. A negated
/// constraint gets the complementary comparator.
pub fn nnf_with_pbc(formula: &Formula) -> Formula {
    to_nnf(formula, true, false)
}

fn to_nnf(formula: &Formula, phase: bool, expand_pbc: bool) -> Formula {
    let rec = |f: &Formula, p: bool| to_nnf(f, p, expand_pbc);
    match formula {
        Formula::True | Formula::False => {
            Formula::constant((*formula == Formula::True) == phase)
        }
        Formula::Lit(l) if phase => Formula::Lit(l.clone()),
        Formula::Lit(l) => Formula::Lit(l.negate()),
        Formula::Not(op) => rec(op, !phase),
        Formula::Impl(a, b) if phase => Formula::or([rec(a, false), rec(b, true)]),
        Formula::Impl(a, b) => Formula::and([rec(a, true), rec(b, false)]),
        Formula::Equiv(a, b) if phase => Formula::and([
            Formula::or([rec(a, false), rec(b, true)]),
            Formula::or([rec(a, true), rec(b, false)]),
        ]),
        Formula::Equiv(a, b) => Formula::and([
            Formula::or([rec(a, false), rec(b, false)]),
            Formula::or([rec(a, true), rec(b, true)]),
        ]),
        Formula::And(ops) if phase => Formula::and(ops.iter().map(|op| rec(op, true))),
        Formula::And(ops) => Formula::or(ops.iter().map(|op| rec(op, false))),
        Formula::Or(ops) if phase => Formula::or(ops.iter().map(|op| rec(op, true))),
        Formula::Or(ops) => Formula::and(ops.iter().map(|op| rec(op, false))),
        Formula::Pbc(pbc) if expand_pbc => to_nnf(&expand(pbc), phase, true),
        Formula::Pbc(pbc) if phase => Formula::Pbc(pbc.clone()),
        Formula::Pbc(pbc) => negate_pbc(pbc),
    }
}

fn negate_pbc(pbc: &Pbc) -> Formula {
    let with = |comparator| Formula::pbc(pbc.terms.clone(), comparator, pbc.rhs);
    match pbc.comparator.complement() {
        Some(comparator) => with(comparator),
        None => Formula::or([with(Comparator::Lt), with(Comparator::Gt)]),
    }
}

/// Conjunctive normal form.
pub fn cnf(formula: &Formula, algorithm: CnfAlgorithm, deadline: &Deadline) -> Result<Formula> {
    Ok(cnf_formula(&cnf_clauses(formula, algorithm, deadline)?))
}

/// Clauses of the conjunctive normal form.
pub(crate) fn cnf_clauses(
    formula: &Formula,
    algorithm: CnfAlgorithm,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    match algorithm {
        CnfAlgorithm::Factorization => {
            Ok(distribute(&nnf(formula), true, None, deadline)?.unwrap_or_default())
        }
        CnfAlgorithm::Advanced => advanced_cnf(formula, deadline),
        CnfAlgorithm::Tseitin | CnfAlgorithm::Pg => {
            let mut clausifier = Clausifier::new(algorithm == CnfAlgorithm::Tseitin);
            clausifier.add_nnf(&nnf(formula), deadline)?;
            Ok(clausifier.take_clauses())
        }
        CnfAlgorithm::Canonical => canonical(formula, true, deadline),
        CnfAlgorithm::Bdd => Bdd::compile(formula, deadline)?.cnf_clauses(),
    }
}

/// Disjunctive normal form.
pub fn dnf(formula: &Formula, algorithm: DnfAlgorithm, deadline: &Deadline) -> Result<Formula> {
    let terms = match algorithm {
        DnfAlgorithm::Factorization => {
            distribute(&nnf(formula), false, None, deadline)?.unwrap_or_default()
        }
        DnfAlgorithm::Canonical => canonical(formula, false, deadline)?,
        DnfAlgorithm::Bdd => Bdd::compile(formula, deadline)?.dnf_terms()?,
    };
    Ok(dnf_formula(&terms))
}

fn advanced_cnf(formula: &Formula, deadline: &Deadline) -> Result<Vec<Clause>> {
    let normal = nnf(formula);
    let operands = match &normal {
        Formula::And(ops) => ops.clone(),
        other => vec![other.clone()],
    };
    let mut clausifier = Clausifier::new(false);
    let mut clauses = Vec::new();
    for operand in &operands {
        match distribute(operand, true, Some(ADVANCED_CLAUSE_BUDGET), deadline)? {
            Some(factorized) => clauses.extend(factorized),
            None => {
                tracing::debug!(
                    budget = ADVANCED_CLAUSE_BUDGET,
                    "clause budget exceeded, falling back to PG"
                );
                clausifier.add_nnf(operand, deadline)?;
                clauses.extend(clausifier.take_clauses());
            }
        }
    }
    Ok(remove_subsumed(clauses))
}

/// Clauses (`cnf`) or terms (`!cnf`) of an NNF formula by distribution.
/// `None` once more than `budget` are produced.
fn distribute(
    formula: &Formula,
    cnf: bool,
    budget: Option<usize>,
    deadline: &Deadline,
) -> Result<Option<Vec<Clause>>> {
    deadline.check()?;
    let over = |n: usize| budget.is_some_and(|b| n > b);
    let result = match formula {
        Formula::True | Formula::False => {
            if (*formula == Formula::True) == cnf {
                Vec::new()
            } else {
                vec![Vec::new()]
            }
        }
        Formula::Lit(l) => vec![vec![l.clone()]],
        Formula::And(ops) | Formula::Or(ops) if matches!(formula, Formula::And(_)) == cnf => {
            let mut all = Vec::new();
            for op in ops {
                match distribute(op, cnf, budget, deadline)? {
                    Some(part) => all.extend(part),
                    None => return Ok(None),
                }
                if over(all.len()) {
                    return Ok(None);
                }
            }
            all
        }
        Formula::And(ops) | Formula::Or(ops) => {
            let mut product: Vec<Clause> = vec![Vec::new()];
            for op in ops {
                let Some(part) = distribute(op, cnf, budget, deadline)? else {
                    return Ok(None);
                };
                let mut next = Vec::new();
                for left in &product {
                    deadline.check()?;
                    next.extend(part.iter().filter_map(|right| merge(left, right)));
                    if over(next.len()) {
                        return Ok(None);
                    }
                }
                product = next;
            }
            product
        }
        other => return distribute(&nnf(other), cnf, budget, deadline),
    };
    Ok(Some(result))
}

/// Canonical normal form from the truth table. The first variable is the
/// most significant, false before true.
fn canonical(formula: &Formula, cnf: bool, deadline: &Deadline) -> Result<Vec<Clause>> {
    let vars = formula.variables();
    let index: HashMap<&str, usize> = vars.iter().enumerate().map(|(i, v)| (v.as_str(), i)).collect();
    let mut values = vec![false; vars.len()];
    let mut out = Vec::new();
    enumerate_rows(0, &mut values, deadline, &mut |values| {
        let value = |name: &str| index.get(name).is_some_and(|&i| values[i]);
        let holds = crate::assignment::eval_with(formula, &value);
        if holds != cnf {
            // CNF: clause excluding a falsifying row; DNF: term of a satisfying row
            out.push(
                vars.iter()
                    .zip(values)
                    .map(|(name, &v)| Literal::new(name.clone(), v != cnf))
                    .collect(),
            );
        }
    })?;
    Ok(out)
}

fn enumerate_rows(
    i: usize,
    values: &mut [bool],
    deadline: &Deadline,
    visit: &mut impl FnMut(&[bool]),
) -> Result<()> {
    if i == values.len() {
        deadline.check()?;
        visit(values);
        return Ok(());
    }
    for v in [false, true] {
        values[i] = v;
        enumerate_rows(i + 1, values, deadline, visit)?;
    }
    Ok(())
}

/// And-inverter graph: only conjunctions, negations and literals.
pub fn aig(formula: &Formula) -> Formula {
    match formula {
        Formula::True | Formula::False | Formula::Lit(_) => formula.clone(),
        Formula::Pbc(pbc) => aig(&expand(pbc)),
        Formula::Not(op) => Formula::not(aig(op)),
        Formula::Impl(a, b) => nand([aig(a), Formula::not(aig(b))]),
        Formula::Equiv(a, b) => {
            let (a, b) = (aig(a), aig(b));
            Formula::and([
                nand([a.clone(), Formula::not(b.clone())]),
                nand([Formula::not(a), b]),
            ])
        }
        Formula::And(ops) => Formula::and(ops.iter().map(aig)),
        Formula::Or(ops) => nand(ops.iter().map(|op| Formula::not(aig(op)))),
    }
}

fn nand(operands: impl IntoIterator<Item = Formula>) -> Formula {
    Formula::not(Formula::and(operands))
}

/// Negations only on literals, no implications, equivalences or PB constraints.
pub fn is_nnf(formula: &Formula) -> bool {
    match formula {
        Formula::True | Formula::False | Formula::Lit(_) => true,
        Formula::And(ops) | Formula::Or(ops) => ops.iter().all(is_nnf),
        _ => false,
    }
}

/// A constant, a clause, or a conjunction of clauses.
pub fn is_cnf(formula: &Formula) -> bool {
    match formula {
        Formula::True | Formula::False => true,
        Formula::And(ops) => ops.iter().all(|op| as_clause(op).is_some()),
        other => as_clause(other).is_some(),
    }
}

/// A constant, a term, or a disjunction of terms.
pub fn is_dnf(formula: &Formula) -> bool {
    match formula {
        Formula::True | Formula::False => true,
        Formula::Or(ops) => ops.iter().all(|op| as_term(op).is_some()),
        other => as_term(other).is_some(),
    }
}

/// Only conjunctions, negations and literals.
pub fn is_aig(formula: &Formula) -> bool {
    match formula {
        Formula::True | Formula::False | Formula::Lit(_) => true,
        Formula::Not(op) => is_aig(op),
        Formula::And(ops) => ops.iter().all(is_aig),
        _ => false,
    }
}

/// A literal or a conjunction of literals.
pub fn is_minterm(formula: &Formula) -> bool {
    as_term(formula).is_some()
}

/// A literal or a disjunction of literals.
pub fn is_maxterm(formula: &Formula) -> bool {
    as_clause(formula).is_some()
}

/// Definitional CNF encoder shared by the transformations and the solver.
///
/// Non-clausal operands receive a fresh `@RESERVED_CNF_<n>` variable. The
/// Plaisted-Greenbaum variant only adds the implication from the variable to
/// its definition, Tseitin adds both directions. PB atoms are encoded with
/// `@RESERVED_PB_<n>` variables and always one-directionally.
pub(crate) struct Clausifier {
    full: bool,
    cnf_aux: AuxVars,
    pb_aux: AuxVars,
    memo: HashMap<Formula, Literal>,
    clauses: Vec<Clause>,
}

impl Clausifier {
    pub(crate) fn new(full: bool) -> Self {
        Self {
            full,
            cnf_aux: AuxVars::new(CNF_PREFIX),
            pb_aux: AuxVars::new(PB_PREFIX),
            memo: HashMap::new(),
            clauses: Vec::new(),
        }
    }

    /// Add any formula; PB constraints stay constraints.
    pub(crate) fn add(&mut self, formula: &Formula, deadline: &Deadline) -> Result<()> {
        self.add_nnf(&nnf_with_pbc(formula), deadline)
    }

    /// Clauses produced since the last call.
    pub(crate) fn take_clauses(&mut self) -> Vec<Clause> {
        std::mem::take(&mut self.clauses)
    }

    pub(crate) fn add_nnf(&mut self, formula: &Formula, deadline: &Deadline) -> Result<()> {
        deadline.check()?;
        match formula {
            Formula::True => {}
            Formula::False => self.clauses.push(Vec::new()),
            Formula::Lit(l) => self.clauses.push(vec![l.clone()]),
            Formula::And(ops) => {
                for op in ops {
                    self.add_nnf(op, deadline)?;
                }
            }
            Formula::Or(ops) => {
                let mut clause = Vec::with_capacity(ops.len());
                for op in ops {
                    clause.push(self.literal_of(op, deadline)?);
                }
                self.clauses.push(clause);
            }
            Formula::Pbc(pbc) => {
                let encoded = pbc_clauses(pbc, &mut self.pb_aux, deadline)?;
                self.clauses.extend(encoded);
            }
            other => self.add_nnf(&nnf_with_pbc(other), deadline)?,
        }
        Ok(())
    }

    fn literal_of(&mut self, formula: &Formula, deadline: &Deadline) -> Result<Literal> {
        deadline.check()?;
        if let Formula::Lit(l) = formula {
            return Ok(l.clone());
        }
        if let Some(l) = self.memo.get(formula) {
            return Ok(l.clone());
        }
        let x = self.cnf_aux.fresh();
        match formula {
            Formula::True | Formula::False => {
                let unit = if *formula == Formula::True { x.clone() } else { x.negate() };
                self.clauses.push(vec![unit]);
            }
            Formula::And(ops) => {
                let mut lits = Vec::with_capacity(ops.len());
                for op in ops {
                    lits.push(self.literal_of(op, deadline)?);
                }
                for l in &lits {
                    self.clauses.push(vec![x.negate(), l.clone()]);
                }
                if self.full {
                    let mut back = vec![x.clone()];
                    back.extend(lits.iter().map(Literal::negate));
                    self.clauses.push(back);
                }
            }
            Formula::Or(ops) => {
                let mut lits = Vec::with_capacity(ops.len());
                for op in ops {
                    lits.push(self.literal_of(op, deadline)?);
                }
                if self.full {
                    for l in &lits {
                        self.clauses.push(vec![x.clone(), l.negate()]);
                    }
                }
                let mut forward = vec![x.negate()];
                forward.extend(lits);
                self.clauses.push(forward);
            }
            Formula::Pbc(pbc) => {
                for clause in pbc_clauses(pbc, &mut self.pb_aux, deadline)? {
                    let mut guarded = vec![x.negate()];
                    guarded.extend(clause);
                    self.clauses.push(guarded);
                }
            }
            other => {
                let inner = self.literal_of(&nnf_with_pbc(other), deadline)?;
                self.clauses.push(vec![x.negate(), inner.clone()]);
                if self.full {
                    self.clauses.push(vec![x.clone(), inner.negate()]);
                }
            }
        }
        self.memo.insert(formula.clone(), x.clone());
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{Assignment, evaluate};
    use crate::parser::parse;

    fn p(text: &str) -> Formula {
        parse(text).unwrap()
    }

    fn cnf_text(text: &str, algorithm: CnfAlgorithm) -> String {
        cnf(&p(text), algorithm, &Deadline::unbounded()).unwrap().to_string()
    }

    #[test]
    fn test_nnf() {
        assert_eq!(
            nnf(&p("~(A & B => ~C <=> D)")).to_string(),
            "(A & B & C | ~D) & (~A | ~B | ~C | D)"
        );
        assert_eq!(nnf(&p("~(A | ~B)")).to_string(), "~A & B");
    }

    #[test]
    fn test_nnf_with_pbc_complements_comparator() {
        assert_eq!(nnf_with_pbc(&p("~(A + B <= 1)")).to_string(), "A + B > 1");
        assert_eq!(
            nnf_with_pbc(&p("~(A + B = 1)")).to_string(),
            "(A + B < 1) | (A + B > 1)"
        );
        assert!(!nnf(&p("~(A + B <= 1)")).to_string().contains('+'));
    }

    #[test]
    fn test_cnf_factorization() {
        assert_eq!(
            cnf_text("~(A & B => ~C <=> D)", CnfAlgorithm::Factorization),
            "(A | ~D) & (B | ~D) & (C | ~D) & (~A | ~B | ~C | D)"
        );
        assert_eq!(
            cnf_text("~(A & B => ~C <=> D)", CnfAlgorithm::Advanced),
            "(A | ~D) & (B | ~D) & (C | ~D) & (~A | ~B | ~C | D)"
        );
    }

    #[test]
    fn test_cnf_pg_and_tseitin() {
        assert_eq!(
            cnf_text("A & B | C", CnfAlgorithm::Pg),
            "(~@RESERVED_CNF_0 | A) & (~@RESERVED_CNF_0 | B) & (@RESERVED_CNF_0 | C)"
        );
        assert_eq!(
            cnf_text("A & B | C", CnfAlgorithm::Tseitin),
            "(~@RESERVED_CNF_0 | A) & (~@RESERVED_CNF_0 | B) & (@RESERVED_CNF_0 | ~A | ~B) \
             & (@RESERVED_CNF_0 | C)"
        );
        // already clausal input stays as is
        assert_eq!(cnf_text("(A | B) & ~C", CnfAlgorithm::Tseitin), "(A | B) & ~C");
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(cnf_text("A | B", CnfAlgorithm::Canonical), "A | B");
        assert_eq!(cnf_text("A & B", CnfAlgorithm::Canonical), "(A | B) & (A | ~B) & (~A | B)");
        let d = dnf(&p("A | B"), DnfAlgorithm::Canonical, &Deadline::unbounded()).unwrap();
        assert_eq!(d.to_string(), "~A & B | A & ~B | A & B");
        assert_eq!(cnf_text("A | ~A", CnfAlgorithm::Canonical), "$true");
    }

    #[test]
    fn test_dnf_factorization() {
        let d = dnf(&p("(A | B) & (C | ~A)"), DnfAlgorithm::Factorization, &Deadline::unbounded())
            .unwrap();
        assert_eq!(d.to_string(), "A & C | B & C | B & ~A");
    }

    #[test]
    fn test_transformations_preserve_models() {
        let f = p("(A => B & ~C) <=> (D | 2*A + B + C >= 2)");
        let deadline = Deadline::unbounded();
        let forms = [
            cnf(&f, CnfAlgorithm::Factorization, &deadline).unwrap(),
            cnf(&f, CnfAlgorithm::Advanced, &deadline).unwrap(),
            cnf(&f, CnfAlgorithm::Canonical, &deadline).unwrap(),
            dnf(&f, DnfAlgorithm::Factorization, &deadline).unwrap(),
            dnf(&f, DnfAlgorithm::Canonical, &deadline).unwrap(),
            aig(&f),
            nnf(&f),
        ];
        for bits in 0..16u32 {
            let assignment = Assignment::from_pairs([
                ("A", bits & 1 != 0),
                ("B", bits & 2 != 0),
                ("C", bits & 4 != 0),
                ("D", bits & 8 != 0),
            ]);
            let expected = evaluate(&f, &assignment);
            for form in &forms {
                assert_eq!(evaluate(form, &assignment), expected, "{form}");
            }
        }
    }

    #[test]
    fn test_aig() {
        assert_eq!(aig(&p("A | B")).to_string(), "~(~A & ~B)");
        assert_eq!(aig(&p("A => B")).to_string(), "~(A & ~B)");
        assert!(is_aig(&aig(&p("A <=> B | C"))));
        assert!(!is_aig(&p("A | B")));
    }

    #[test]
    fn test_predicates() {
        assert!(is_nnf(&p("A & (~B | C)")));
        assert!(!is_nnf(&p("~(A & B)")));
        assert!(!is_nnf(&p("A => B")));
        assert!(is_cnf(&p("(A | B) & ~C")));
        assert!(is_cnf(&p("A | B")));
        assert!(!is_cnf(&p("A & B | C")));
        assert!(is_dnf(&p("A & B | C")));
        assert!(!is_dnf(&p("(A | B) & ~C")));
        assert!(is_minterm(&p("A & ~B")));
        assert!(!is_minterm(&p("A | ~B")));
        assert!(is_maxterm(&p("A | ~B")));
        assert!(is_maxterm(&p("A")));
        assert!(!is_cnf(&p("A + B <= 1")));
    }

    #[test]
    fn test_cnf_honours_deadline() {
        let deadline = Deadline::unbounded();
        deadline.token().cancel();
        let err = cnf(&p("A & B | C"), CnfAlgorithm::Factorization, &deadline).unwrap_err();
        assert!(err.is_aborted());
    }
}
