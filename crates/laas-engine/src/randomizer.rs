// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Seeded random formula generation.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::deadline::Deadline;
use crate::error::Result;
use crate::formula::{Comparator, Formula, Literal};

/// Maximum operand count of generated conjunctions and disjunctions.
const MAX_OPERANDS: usize = 5;
/// Maximum number of terms in generated PB constraints.
const MAX_PB_TERMS: usize = 5;
/// Largest absolute PB coefficient.
const MAX_COEFFICIENT: i64 = 10;

const COMPARATORS: [Comparator; 5] = [
    Comparator::Eq,
    Comparator::Le,
    Comparator::Lt,
    Comparator::Ge,
    Comparator::Gt,
];

/// Deterministic generator over the variables `v0 .. v<n-1>`.
///
/// Variable names are zero padded to the width of the largest index, so
/// 25 variables are named `v00` to `v24`.
pub struct Randomizer {
    rng: StdRng,
    vars: Vec<String>,
    deadline: Deadline,
}

impl Randomizer {
    /// `num_vars` is raised to at least one.
    pub fn new(seed: u64, num_vars: usize, deadline: Deadline) -> Self {
        let n = num_vars.max(1);
        let width = (n - 1).to_string().len();
        let vars = (0..n).map(|i| format!("v{i:0width$}")).collect();
        Self {
            rng: StdRng::seed_from_u64(seed),
            vars,
            deadline,
        }
    }

    pub fn constant(&mut self) -> Formula {
        Formula::constant(self.rng.gen_bool(0.5))
    }

    pub fn variable(&mut self) -> Formula {
        let i = self.rng.gen_range(0..self.vars.len());
        Formula::var(self.vars[i].clone())
    }

    pub fn literal(&mut self) -> Formula {
        Formula::Lit(self.random_literal())
    }

    fn random_literal(&mut self) -> Literal {
        let i = self.rng.gen_range(0..self.vars.len());
        Literal::new(self.vars[i].clone(), self.rng.gen_bool(0.5))
    }

    /// A literal, or rarely a constant.
    pub fn atom(&mut self) -> Formula {
        if self.rng.gen_ratio(1, 10) {
            self.constant()
        } else {
            self.literal()
        }
    }

    pub fn not(&mut self, depth: usize) -> Result<Formula> {
        if depth == 0 {
            return Ok(self.atom());
        }
        Ok(Formula::not(self.formula(depth - 1)?))
    }

    pub fn implication(&mut self, depth: usize) -> Result<Formula> {
        if depth == 0 {
            return Ok(self.atom());
        }
        let left = self.formula(depth - 1)?;
        let right = self.formula(depth - 1)?;
        Ok(Formula::implication(left, right))
    }

    pub fn equivalence(&mut self, depth: usize) -> Result<Formula> {
        if depth == 0 {
            return Ok(self.atom());
        }
        let left = self.formula(depth - 1)?;
        let right = self.formula(depth - 1)?;
        Ok(Formula::equivalence(left, right))
    }

    pub fn and(&mut self, depth: usize) -> Result<Formula> {
        Ok(Formula::and(self.operands(depth)?))
    }

    pub fn or(&mut self, depth: usize) -> Result<Formula> {
        Ok(Formula::or(self.operands(depth)?))
    }

    fn operands(&mut self, depth: usize) -> Result<Vec<Formula>> {
        if depth == 0 {
            return Ok(vec![self.atom()]);
        }
        let n = self.rng.gen_range(2..=MAX_OPERANDS);
        (0..n).map(|_| self.formula(depth - 1)).collect()
    }

    /// Cardinality constraint over distinct positive variables.
    pub fn cc(&mut self) -> Formula {
        let vars = self.distinct_vars();
        let n = vars.len() as i64;
        let comparator = COMPARATORS[self.rng.gen_range(0..COMPARATORS.len())];
        let rhs = self.rng.gen_range(0..=n);
        Formula::pbc(
            vars.into_iter().map(|v| (1, Literal::positive(v))).collect(),
            comparator,
            rhs,
        )
    }

    /// At-most-one constraint.
    pub fn amo(&mut self) -> Formula {
        self.bounded_one(Comparator::Le)
    }

    /// Exactly-one constraint.
    pub fn exo(&mut self) -> Formula {
        self.bounded_one(Comparator::Eq)
    }

    fn bounded_one(&mut self, comparator: Comparator) -> Formula {
        let vars = self.distinct_vars();
        Formula::pbc(
            vars.into_iter().map(|v| (1, Literal::positive(v))).collect(),
            comparator,
            1,
        )
    }

    /// General PB constraint with non-zero coefficients.
    pub fn pbc(&mut self) -> Formula {
        let vars = self.distinct_vars();
        let mut terms = Vec::with_capacity(vars.len());
        for v in vars {
            let magnitude = self.rng.gen_range(1..=MAX_COEFFICIENT);
            let coefficient = if self.rng.gen_bool(0.5) { magnitude } else { -magnitude };
            terms.push((coefficient, Literal::new(v, self.rng.gen_bool(0.5))));
        }
        let min: i64 = terms.iter().map(|(c, _)| (*c).min(0)).sum();
        let max: i64 = terms.iter().map(|(c, _)| (*c).max(0)).sum();
        let comparator = COMPARATORS[self.rng.gen_range(0..COMPARATORS.len())];
        let rhs = self.rng.gen_range(min..=max);
        Formula::pbc(terms, comparator, rhs)
    }

    fn distinct_vars(&mut self) -> Vec<String> {
        let limit = self.vars.len().min(MAX_PB_TERMS);
        let k = self.rng.gen_range(1..=limit);
        sample(&mut self.rng, self.vars.len(), k)
            .into_iter()
            .map(|i| self.vars[i].clone())
            .collect()
    }

    /// Arbitrary formula of at most `depth` operator levels.
    pub fn formula(&mut self, depth: usize) -> Result<Formula> {
        self.deadline.check()?;
        if depth == 0 {
            return Ok(self.atom());
        }
        match self.rng.gen_range(0..9) {
            0..=2 => self.and(depth),
            3..=5 => self.or(depth),
            6 => self.not(depth),
            7 => self.implication(depth),
            _ => self.equivalence(depth),
        }
    }
}
