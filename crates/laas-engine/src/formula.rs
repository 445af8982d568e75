// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Propositional formulas with pseudo-Boolean constraints.
//!
//! Formulas are built through smart constructors which keep them in a small
//! canonical shape: n-ary operators are flattened and deduplicated, constants
//! are absorbed, and a conjunction (disjunction) holding a literal together
//! with its negation collapses to `$false` (`$true`).
//!
//! [`Display`](std::fmt::Display) prints the textual syntax accepted by
//! [`crate::parser::parse`] with minimal parentheses.

use std::collections::HashSet;
use std::fmt;

/// A variable with a phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// Variable name.
    pub name: String,
    /// `true` for the positive literal.
    pub phase: bool,
}

impl Literal {
    /// Literal of `name` with the given phase.
    pub fn new(name: impl Into<String>, phase: bool) -> Self {
        Self {
            name: name.into(),
            phase,
        }
    }

    /// Positive literal of `name`.
    pub fn positive(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Same variable, opposite phase.
    pub fn negate(&self) -> Self {
        Self::new(self.name.clone(), !self.phase)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phase {
            f.write_str(&self.name)
        } else {
            write!(f, "~{}", self.name)
        }
    }
}

/// Comparison operator of a pseudo-Boolean constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
}

impl Comparator {
    /// Evaluate `lhs <op> rhs`.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::Eq => lhs == rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Lt => lhs < rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Gt => lhs > rhs,
        }
    }

    /// The comparator of the negated constraint. `Eq` has none.
    pub fn complement(self) -> Option<Self> {
        match self {
            Comparator::Eq => None,
            Comparator::Le => Some(Comparator::Gt),
            Comparator::Lt => Some(Comparator::Ge),
            Comparator::Ge => Some(Comparator::Lt),
            Comparator::Gt => Some(Comparator::Le),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparator::Eq => "=",
            Comparator::Le => "<=",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Gt => ">",
        })
    }
}

/// `sum(coefficient * literal) <comparator> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pbc {
    /// Weighted literals.
    pub terms: Vec<(i64, Literal)>,
    /// Comparison operator.
    pub comparator: Comparator,
    /// Right-hand side.
    pub rhs: i64,
}

impl Pbc {
    /// Largest `sum(|c_i|) + |rhs|` a constraint may have.
    ///
    /// Normalization, restriction and the encodings shift the right-hand
    /// side by at most the coefficient sum, so every intermediate value of a
    /// constraint within this bound fits an `i64`.
    pub const MAX_MAGNITUDE: i64 = i64::MAX / 4;

    /// `sum(|c_i|) + |rhs|` does not exceed [`Pbc::MAX_MAGNITUDE`].
    pub fn in_range(coefficients: impl IntoIterator<Item = i64>, rhs: i64) -> bool {
        let magnitude = coefficients
            .into_iter()
            .map(|c| i128::from(c).abs())
            .sum::<i128>()
            + i128::from(rhs).abs();
        magnitude <= i128::from(Self::MAX_MAGNITUDE)
    }

    /// Cardinality constraint: every coefficient is 1 and every literal positive.
    pub fn is_cardinality(&self) -> bool {
        self.terms.iter().all(|(c, l)| *c == 1 && l.phase)
    }

    /// Left-hand side under a total assignment.
    pub fn lhs(&self, value: impl Fn(&str) -> bool) -> i64 {
        self.terms
            .iter()
            .filter(|(_, l)| value(&l.name) == l.phase)
            .map(|(c, _)| *c)
            .sum()
    }
}

impl fmt::Display for Pbc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (coefficient, literal)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            if *coefficient != 1 {
                write!(f, "{coefficient}*")?;
            }
            write!(f, "{literal}")?;
        }
        write!(f, " {} {}", self.comparator, self.rhs)
    }
}

/// A propositional formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    Lit(Literal),
    Not(Box<Formula>),
    Impl(Box<Formula>, Box<Formula>),
    Equiv(Box<Formula>, Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Pbc(Pbc),
}

impl Formula {
    /// Constant from a boolean.
    pub fn constant(value: bool) -> Self {
        if value { Formula::True } else { Formula::False }
    }

    /// Positive literal.
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Lit(Literal::positive(name))
    }

    /// Literal with a phase.
    pub fn lit(name: impl Into<String>, phase: bool) -> Self {
        Formula::Lit(Literal::new(name, phase))
    }

    /// Negation. Constants and literals are negated in place, double
    /// negations cancel.
    pub fn not(operand: Formula) -> Self {
        match operand {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Lit(l) => Formula::Lit(l.negate()),
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }

    /// Implication.
    pub fn implication(left: Formula, right: Formula) -> Self {
        match (left, right) {
            (Formula::False, _) | (_, Formula::True) => Formula::True,
            (Formula::True, right) => right,
            (left, Formula::False) => Formula::not(left),
            (left, right) if left == right => Formula::True,
            (left, right) => Formula::Impl(Box::new(left), Box::new(right)),
        }
    }

    /// Equivalence.
    pub fn equivalence(left: Formula, right: Formula) -> Self {
        match (left, right) {
            (Formula::True, other) | (other, Formula::True) => other,
            (Formula::False, other) | (other, Formula::False) => Formula::not(other),
            (left, right) if left == right => Formula::True,
            (left, right) if left == Formula::not(right.clone()) => Formula::False,
            (left, right) => Formula::Equiv(Box::new(left), Box::new(right)),
        }
    }

    /// Conjunction.
    pub fn and(operands: impl IntoIterator<Item = Formula>) -> Self {
        Nary::new(true).build(operands)
    }

    /// Disjunction.
    pub fn or(operands: impl IntoIterator<Item = Formula>) -> Self {
        Nary::new(false).build(operands)
    }

    /// Disjunction of literals.
    pub fn clause(literals: impl IntoIterator<Item = Literal>) -> Self {
        Formula::or(literals.into_iter().map(Formula::Lit))
    }

    /// Pseudo-Boolean constraint. Zero coefficients are dropped and a
    /// constraint without terms collapses to a constant.
    pub fn pbc(terms: Vec<(i64, Literal)>, comparator: Comparator, rhs: i64) -> Self {
        let terms: Vec<_> = terms.into_iter().filter(|(c, _)| *c != 0).collect();
        if terms.is_empty() {
            return Formula::constant(comparator.holds(0, rhs));
        }
        Formula::Pbc(Pbc {
            terms,
            comparator,
            rhs,
        })
    }

    /// `$true` or `$false`.
    pub fn is_constant(&self) -> bool {
        matches!(self, Formula::True | Formula::False)
    }

    /// A single literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Formula::Lit(_))
    }

    /// Direct operands.
    pub fn operands(&self) -> Vec<&Formula> {
        match self {
            Formula::Not(op) => vec![op.as_ref()],
            Formula::Impl(l, r) | Formula::Equiv(l, r) => vec![l.as_ref(), r.as_ref()],
            Formula::And(ops) | Formula::Or(ops) => ops.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Variables in order of first occurrence.
    pub fn variables(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.visit_literals(&mut |l| {
            if seen.insert(l.name.clone()) {
                out.push(l.name.clone());
            }
        });
        out
    }

    /// Literals in order of first occurrence.
    pub fn literals(&self) -> Vec<Literal> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.visit_literals(&mut |l| {
            if seen.insert(l.clone()) {
                out.push(l.clone());
            }
        });
        out
    }

    /// Call `f` on every literal occurrence, left to right.
    ///
    /// A literal under a negation is reported as written, not with its
    /// effective polarity.
    pub fn visit_literals(&self, f: &mut impl FnMut(&Literal)) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Lit(l) => f(l),
            Formula::Pbc(pbc) => pbc.terms.iter().for_each(|(_, l)| f(l)),
            other => other
                .operands()
                .into_iter()
                .for_each(|op| op.visit_literals(f)),
        }
    }

    /// Binding strength used by the printer.
    fn precedence(&self) -> u8 {
        match self {
            Formula::Pbc(_) => 0,
            Formula::Equiv(..) => 1,
            Formula::Impl(..) => 2,
            Formula::Or(_) => 3,
            Formula::And(_) => 4,
            Formula::Not(_) => 5,
            Formula::True | Formula::False | Formula::Lit(_) => 6,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => f.write_str("$true"),
            Formula::False => f.write_str("$false"),
            Formula::Lit(l) => write!(f, "{l}"),
            Formula::Pbc(pbc) => write!(f, "{pbc}"),
            Formula::Not(op) => {
                f.write_str("~")?;
                op.write_operand(f, op.precedence() < 6)
            }
            Formula::Impl(l, r) | Formula::Equiv(l, r) => {
                let (symbol, own) = if matches!(self, Formula::Impl(..)) {
                    (" => ", 2)
                } else {
                    (" <=> ", 1)
                };
                // right associative
                l.write_operand(f, l.precedence() <= own)?;
                f.write_str(symbol)?;
                r.write_operand(f, r.precedence() < own)
            }
            Formula::And(ops) | Formula::Or(ops) => {
                let (symbol, own) = if matches!(self, Formula::And(_)) {
                    (" & ", 4)
                } else {
                    (" | ", 3)
                };
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(symbol)?;
                    }
                    op.write_operand(f, op.precedence() < own)?;
                }
                Ok(())
            }
        }
    }
}

/// Accumulator for n-ary operators.
struct Nary {
    conjunctive: bool,
    operands: Vec<Formula>,
    seen: HashSet<Formula>,
    literals: HashSet<Literal>,
}

impl Nary {
    fn new(conjunctive: bool) -> Self {
        Self {
            conjunctive,
            operands: Vec::new(),
            seen: HashSet::new(),
            literals: HashSet::new(),
        }
    }

    fn build(mut self, operands: impl IntoIterator<Item = Formula>) -> Formula {
        for operand in operands {
            if !self.push(operand) {
                return Formula::constant(!self.conjunctive);
            }
        }
        match self.operands.len() {
            0 => Formula::constant(self.conjunctive),
            1 => self.operands.pop().unwrap_or(Formula::True),
            _ if self.conjunctive => Formula::And(self.operands),
            _ => Formula::Or(self.operands),
        }
    }

    /// Returns false when the absorbing element was reached.
    fn push(&mut self, operand: Formula) -> bool {
        match operand {
            Formula::True => self.conjunctive,
            Formula::False => !self.conjunctive,
            Formula::And(inner) if self.conjunctive => inner.into_iter().all(|op| self.push(op)),
            Formula::Or(inner) if !self.conjunctive => inner.into_iter().all(|op| self.push(op)),
            Formula::Lit(l) => {
                if self.literals.contains(&l.negate()) {
                    return false;
                }
                if self.literals.insert(l.clone()) {
                    self.seen.insert(Formula::Lit(l.clone()));
                    self.operands.push(Formula::Lit(l));
                }
                true
            }
            other => {
                if self.seen.insert(other.clone()) {
                    self.operands.push(other);
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Formula {
        Formula::var(name)
    }

    #[test]
    fn test_and_flattens_and_dedupes() {
        let f = Formula::and([v("A"), Formula::and([v("B"), v("A")]), Formula::True]);
        assert_eq!(f, Formula::And(vec![v("A"), v("B")]));
        assert_eq!(f.to_string(), "A & B");
    }

    #[test]
    fn test_and_complementary_literals() {
        assert_eq!(Formula::and([v("A"), Formula::lit("A", false)]), Formula::False);
        assert_eq!(Formula::or([v("A"), Formula::lit("A", false)]), Formula::True);
    }

    #[test]
    fn test_constants_absorb() {
        assert_eq!(Formula::and([v("A"), Formula::False]), Formula::False);
        assert_eq!(Formula::or([v("A"), Formula::True]), Formula::True);
        assert_eq!(Formula::and(Vec::new()), Formula::True);
        assert_eq!(Formula::or(Vec::new()), Formula::False);
        assert_eq!(Formula::and([v("A")]), v("A"));
    }

    #[test]
    fn test_not_simplifies() {
        let ab = Formula::and([v("A"), v("B")]);
        assert_eq!(Formula::not(Formula::not(ab.clone())), ab);
        assert_eq!(Formula::not(v("A")), Formula::lit("A", false));
        assert_eq!(Formula::not(Formula::True), Formula::False);
    }

    #[test]
    fn test_binary_operator_simplification() {
        assert_eq!(Formula::implication(Formula::True, v("B")), v("B"));
        assert_eq!(Formula::implication(v("A"), Formula::False), Formula::lit("A", false));
        assert_eq!(Formula::implication(v("A"), v("A")), Formula::True);
        assert_eq!(Formula::equivalence(v("A"), Formula::False), Formula::lit("A", false));
        assert_eq!(Formula::equivalence(v("A"), Formula::lit("A", false)), Formula::False);
    }

    #[test]
    fn test_printer_parenthesization() {
        let f = Formula::not(Formula::equivalence(
            Formula::implication(Formula::and([v("A"), v("B")]), Formula::lit("C", false)),
            v("D"),
        ));
        assert_eq!(f.to_string(), "~(A & B => ~C <=> D)");

        let g = Formula::and([Formula::or([v("A"), v("B")]), v("C")]);
        assert_eq!(g.to_string(), "(A | B) & C");

        let h = Formula::implication(Formula::implication(v("A"), v("B")), v("C"));
        assert_eq!(h.to_string(), "(A => B) => C");
    }

    #[test]
    fn test_pbc_printing() {
        let f = Formula::pbc(
            vec![(2, Literal::positive("A")), (1, Literal::new("B", false)), (-3, Literal::positive("C"))],
            Comparator::Ge,
            2,
        );
        assert_eq!(f.to_string(), "2*A + ~B + -3*C >= 2");
        let nested = Formula::and([f, v("D")]);
        assert_eq!(nested.to_string(), "(2*A + ~B + -3*C >= 2) & D");
    }

    #[test]
    fn test_pbc_without_terms_is_constant() {
        assert_eq!(Formula::pbc(vec![(0, Literal::positive("A"))], Comparator::Le, 1), Formula::True);
        assert_eq!(Formula::pbc(Vec::new(), Comparator::Gt, 0), Formula::False);
    }

    #[test]
    fn test_variables_first_occurrence() {
        let f = Formula::or([Formula::and([v("B"), Formula::lit("A", false)]), v("B"), v("C")]);
        assert_eq!(f.variables(), vec!["B", "A", "C"]);
        assert_eq!(
            f.literals(),
            vec![Literal::positive("B"), Literal::new("A", false), Literal::positive("C")]
        );
    }
}
