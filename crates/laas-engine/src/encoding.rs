// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! CNF encodings of cardinality and pseudo-Boolean constraints.
//!
//! | Constraint | Encodings |
//! |------------|-----------|
//! | at-most-one | pure (pairwise), ladder, binary, totalizer |
//! | at-most-k / at-least-k / exactly-k | totalizer |
//! | general pseudo-Boolean | sequential weight counter |

use crate::clause::{AuxVars, Clause, cnf_formula};
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::{Comparator, Formula, Literal, Pbc};
use crate::pseudo::{AtMost, normalize};

/// Upper bound on the auxiliary variables a single sequential weight counter
/// may introduce.
pub const SWC_VARIABLE_LIMIT: usize = 10_000_000;

/// Encoding used for at-most-one constraints. Larger bounds always use the
/// totalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcAlgorithm {
    Pure,
    Ladder,
    Binary,
    Totalizer,
}

/// Encoding used for general pseudo-Boolean constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbcAlgorithm {
    Swc,
}

/// Encode a cardinality constraint.
pub fn encode_cc(
    formula: &Formula,
    algorithm: CcAlgorithm,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Formula> {
    match formula {
        Formula::Pbc(pbc) if pbc.is_cardinality() => {
            Ok(cnf_formula(&cc_clauses(pbc, algorithm, aux, deadline)?))
        }
        other => Err(EngineError::rejected(format!(
            "input '{other}' is not a cardinality constraint"
        ))),
    }
}

/// Encode a pseudo-Boolean constraint. Cardinality constraints are
/// accepted too and use the default cardinality encodings.
pub fn encode_pbc(
    formula: &Formula,
    algorithm: PbcAlgorithm,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Formula> {
    match formula {
        Formula::Pbc(pbc) => {
            let PbcAlgorithm::Swc = algorithm;
            Ok(cnf_formula(&pbc_clauses(pbc, aux, deadline)?))
        }
        other => Err(EngineError::rejected(format!(
            "input '{other}' is not a pseudo-Boolean constraint"
        ))),
    }
}

/// Clauses of an arbitrary constraint, used when a solver needs one.
pub(crate) fn pbc_clauses(
    pbc: &Pbc,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    if pbc.is_cardinality() {
        return cc_clauses(pbc, CcAlgorithm::Pure, aux, deadline);
    }
    let mut clauses = Vec::new();
    for constraint in normalize(pbc) {
        clauses.extend(at_most_clauses(&constraint, aux, deadline)?);
    }
    Ok(clauses)
}

/// Clauses of `sum(c_i * l_i) <= k` with positive coefficients.
pub(crate) fn at_most_clauses(
    constraint: &AtMost,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    if constraint.is_infeasible() {
        return Ok(vec![Vec::new()]);
    }
    if constraint.is_trivial() {
        return Ok(Vec::new());
    }
    if constraint.is_cardinality() {
        return amk(
            &constraint.literals(),
            constraint.rhs as usize,
            CcAlgorithm::Totalizer,
            aux,
            deadline,
        );
    }
    swc(&constraint.terms, constraint.rhs, aux, deadline)
}

fn cc_clauses(
    pbc: &Pbc,
    algorithm: CcAlgorithm,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    let vars: Vec<Literal> = pbc.terms.iter().map(|(_, l)| l.clone()).collect();
    let n = vars.len() as i64;
    let k = pbc.rhs;
    match pbc.comparator {
        Comparator::Le => at_most(&vars, k, algorithm, aux, deadline),
        Comparator::Lt => at_most(&vars, k - 1, algorithm, aux, deadline),
        Comparator::Ge => at_least(&vars, k, aux, deadline),
        Comparator::Gt => at_least(&vars, k + 1, aux, deadline),
        Comparator::Eq if k < 0 || k > n => Ok(vec![Vec::new()]),
        Comparator::Eq if k == 1 => {
            let mut clauses = at_most(&vars, 1, algorithm, aux, deadline)?;
            clauses.push(vars.clone());
            Ok(clauses)
        }
        Comparator::Eq => {
            let mut clauses = at_most(&vars, k, algorithm, aux, deadline)?;
            clauses.extend(at_least(&vars, k, aux, deadline)?);
            Ok(clauses)
        }
    }
}

fn at_most(
    vars: &[Literal],
    k: i64,
    algorithm: CcAlgorithm,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    if k < 0 {
        return Ok(vec![Vec::new()]);
    }
    if k as usize >= vars.len() {
        return Ok(Vec::new());
    }
    amk(vars, k as usize, algorithm, aux, deadline)
}

fn at_least(
    vars: &[Literal],
    k: i64,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    let n = vars.len() as i64;
    if k <= 0 {
        return Ok(Vec::new());
    }
    if k > n {
        return Ok(vec![Vec::new()]);
    }
    if k == 1 {
        return Ok(vec![vars.to_vec()]);
    }
    // at least k of n true <=> at most n-k of the negations true
    let negated: Vec<Literal> = vars.iter().map(Literal::negate).collect();
    amk(&negated, (n - k) as usize, CcAlgorithm::Totalizer, aux, deadline)
}

/// `k < vars.len()` is required.
fn amk(
    vars: &[Literal],
    k: usize,
    algorithm: CcAlgorithm,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    if k == 0 {
        return Ok(vars.iter().map(|l| vec![l.negate()]).collect());
    }
    if k == 1 {
        match algorithm {
            CcAlgorithm::Pure => return amo_pure(vars, deadline),
            CcAlgorithm::Ladder => return Ok(amo_ladder(vars, aux)),
            CcAlgorithm::Binary => return Ok(amo_binary(vars, aux)),
            CcAlgorithm::Totalizer => {}
        }
    }
    totalizer(vars, k, aux, deadline)
}

fn amo_pure(vars: &[Literal], deadline: &Deadline) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();
    for i in 0..vars.len() {
        deadline.check()?;
        for j in i + 1..vars.len() {
            clauses.push(vec![vars[i].negate(), vars[j].negate()]);
        }
    }
    Ok(clauses)
}

fn amo_ladder(vars: &[Literal], aux: &mut AuxVars) -> Vec<Clause> {
    let n = vars.len();
    let seq = aux.fresh_n(n - 1);
    let mut clauses = Vec::new();
    for i in 0..n - 1 {
        clauses.push(vec![vars[i].negate(), seq[i].clone()]);
        if i > 0 {
            clauses.push(vec![seq[i - 1].negate(), seq[i].clone()]);
            clauses.push(vec![vars[i].negate(), seq[i - 1].negate()]);
        }
    }
    clauses.push(vec![vars[n - 1].negate(), seq[n - 2].negate()]);
    clauses
}

fn amo_binary(vars: &[Literal], aux: &mut AuxVars) -> Vec<Clause> {
    let n = vars.len();
    let width = usize::BITS - (n - 1).leading_zeros();
    let bits = aux.fresh_n(width as usize);
    let mut clauses = Vec::new();
    for (i, var) in vars.iter().enumerate() {
        for (j, bit) in bits.iter().enumerate() {
            let bit = if (i >> j) & 1 == 1 { bit.clone() } else { bit.negate() };
            clauses.push(vec![var.negate(), bit]);
        }
    }
    clauses
}

/// Unary counter tree; output `i` is true if at least `i + 1` inputs are.
fn totalizer(
    vars: &[Literal],
    k: usize,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();
    let outputs = totalizer_tree(vars, k + 1, aux, &mut clauses, deadline)?;
    if let Some(overflow) = outputs.get(k) {
        clauses.push(vec![overflow.negate()]);
    }
    Ok(clauses)
}

fn totalizer_tree(
    vars: &[Literal],
    cap: usize,
    aux: &mut AuxVars,
    clauses: &mut Vec<Clause>,
    deadline: &Deadline,
) -> Result<Vec<Literal>> {
    if vars.len() == 1 {
        return Ok(vars.to_vec());
    }
    let (left, right) = vars.split_at(vars.len() / 2);
    let a = totalizer_tree(left, cap, aux, clauses, deadline)?;
    let b = totalizer_tree(right, cap, aux, clauses, deadline)?;
    let size = (a.len() + b.len()).min(cap);
    let r = aux.fresh_n(size);
    for i in 0..=a.len() {
        deadline.check()?;
        for j in 0..=b.len() {
            let sum = i + j;
            if sum == 0 || sum > size {
                continue;
            }
            let mut clause = Vec::with_capacity(3);
            if i > 0 {
                clause.push(a[i - 1].negate());
            }
            if j > 0 {
                clause.push(b[j - 1].negate());
            }
            clause.push(r[sum - 1].clone());
            clauses.push(clause);
        }
    }
    Ok(r)
}

/// Sequential weight counter for `sum(w_i * x_i) <= k`.
///
/// Counter rows are built one item at a time so that a fired deadline stops
/// the encoding before the next row is allocated.
fn swc(
    terms: &[(i64, Literal)],
    k: i64,
    aux: &mut AuxVars,
    deadline: &Deadline,
) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();
    let mut items = Vec::new();
    for (w, x) in terms {
        if *w > k {
            clauses.push(vec![x.negate()]);
        } else {
            items.push((*w as usize, x.clone()));
        }
    }
    let k = k as usize;
    if items.is_empty() || k == 0 {
        clauses.extend(items.iter().map(|(_, x)| vec![x.negate()]));
        return Ok(clauses);
    }
    if items.len().saturating_mul(k) > SWC_VARIABLE_LIMIT {
        return Err(EngineError::rejected(format!(
            "pseudo-Boolean constraint needs more than {SWC_VARIABLE_LIMIT} auxiliary variables"
        )));
    }
    // row i, column j: the first i + 1 items sum to at least j + 1
    let mut previous: Vec<Literal> = Vec::new();
    for (i, (w, x)) in items.iter().enumerate() {
        let w = *w;
        let row = fresh_row(aux, k, deadline)?;
        for j in 0..w {
            clauses.push(vec![x.negate(), row[j].clone()]);
        }
        if i > 0 {
            deadline.check()?;
            for j in 0..k {
                clauses.push(vec![previous[j].negate(), row[j].clone()]);
            }
            for j in 0..k - w {
                clauses.push(vec![previous[j].negate(), x.negate(), row[j + w].clone()]);
            }
            clauses.push(vec![previous[k - w].negate(), x.negate()]);
        }
        previous = row;
    }
    Ok(clauses)
}

fn fresh_row(aux: &mut AuxVars, k: usize, deadline: &Deadline) -> Result<Vec<Literal>> {
    let mut row = Vec::with_capacity(k);
    for j in 0..k {
        if j % 4096 == 0 {
            deadline.check()?;
        }
        row.push(aux.fresh());
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{CC_PREFIX, PB_PREFIX};
    use crate::parser::parse;

    fn cc(text: &str, algorithm: CcAlgorithm) -> String {
        let mut aux = AuxVars::new(CC_PREFIX);
        encode_cc(&parse(text).unwrap(), algorithm, &mut aux, &Deadline::unbounded())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_amo_pure() {
        assert_eq!(
            cc("A + B + C + D <= 1", CcAlgorithm::Pure),
            "(~A | ~B) & (~A | ~C) & (~A | ~D) & (~B | ~C) & (~B | ~D) & (~C | ~D)"
        );
    }

    #[test]
    fn test_amo_ladder() {
        assert_eq!(
            cc("A + B + C + D <= 1", CcAlgorithm::Ladder),
            "(~A | @RESERVED_CC_0) & (~B | @RESERVED_CC_1) & (~@RESERVED_CC_0 | @RESERVED_CC_1) \
             & (~B | ~@RESERVED_CC_0) & (~C | @RESERVED_CC_2) & (~@RESERVED_CC_1 | @RESERVED_CC_2) \
             & (~C | ~@RESERVED_CC_1) & (~D | ~@RESERVED_CC_2)"
        );
    }

    #[test]
    fn test_amo_binary() {
        assert_eq!(
            cc("A + B + C <= 1", CcAlgorithm::Binary),
            "(~A | ~@RESERVED_CC_0) & (~A | ~@RESERVED_CC_1) & (~B | @RESERVED_CC_0) \
             & (~B | ~@RESERVED_CC_1) & (~C | ~@RESERVED_CC_0) & (~C | @RESERVED_CC_1)"
        );
    }

    #[test]
    fn test_exo_adds_at_least_one() {
        assert_eq!(
            cc("A + B + C = 1", CcAlgorithm::Pure),
            "(~A | ~B) & (~A | ~C) & (~B | ~C) & (A | B | C)"
        );
    }

    #[test]
    fn test_trivial_bounds() {
        assert_eq!(cc("A + B <= 2", CcAlgorithm::Pure), "$true");
        assert_eq!(cc("A + B >= 3", CcAlgorithm::Pure), "$false");
        assert_eq!(cc("A + B >= 1", CcAlgorithm::Pure), "A | B");
        assert_eq!(cc("A + B <= 0", CcAlgorithm::Pure), "~A & ~B");
    }

    #[test]
    fn test_rejects_non_cardinality() {
        let mut aux = AuxVars::new(CC_PREFIX);
        let deadline = Deadline::unbounded();
        let err = encode_cc(&parse("2*A + B <= 1").unwrap(), CcAlgorithm::Pure, &mut aux, &deadline)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "input '2*A + B <= 1' is not a cardinality constraint"
        );
        let err = encode_pbc(&parse("A & B").unwrap(), PbcAlgorithm::Swc, &mut aux, &deadline)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "input 'A & B' is not a pseudo-Boolean constraint"
        );
    }

    #[test]
    fn test_swc_uses_pb_prefix() {
        let mut aux = AuxVars::new(PB_PREFIX);
        let encoded = encode_pbc(
            &parse("2*A + 3*B + C <= 3").unwrap(),
            PbcAlgorithm::Swc,
            &mut aux,
            &Deadline::unbounded(),
        )
        .unwrap();
        assert!(encoded.to_string().contains("@RESERVED_PBC_0"));
    }
}
