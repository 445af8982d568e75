// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Decision-DNNF compilation.
//!
//! The compiler splits a conjunction into variable-disjoint components and
//! compiles each one separately. A single component is expanded on its most
//! frequent variable: `v & f[v := 1] | ~v & f[v := 0]`. Results are cached on
//! the cofactored formula.

use std::collections::{BTreeMap, HashMap};

use crate::assignment::{Assignment, restrict};
use crate::deadline::Deadline;
use crate::error::Result;
use crate::formula::Formula;

/// Compile into decision-DNNF.
pub fn compile(formula: &Formula, deadline: &Deadline) -> Result<Formula> {
    let mut cache = HashMap::new();
    compile_cached(formula, &mut cache, deadline)
}

fn compile_cached(
    formula: &Formula,
    cache: &mut HashMap<Formula, Formula>,
    deadline: &Deadline,
) -> Result<Formula> {
    deadline.check()?;
    if formula.is_constant() || formula.is_literal() {
        return Ok(formula.clone());
    }
    if let Some(hit) = cache.get(formula) {
        return Ok(hit.clone());
    }
    let parts = components(formula);
    let compiled = if parts.len() > 1 {
        let mut compiled = Vec::with_capacity(parts.len());
        for part in &parts {
            compiled.push(compile_cached(part, cache, deadline)?);
        }
        Formula::and(compiled)
    } else if let Some(var) = branch_variable(formula) {
        let high = compile_cached(&cofactor(formula, &var, true), cache, deadline)?;
        let low = compile_cached(&cofactor(formula, &var, false), cache, deadline)?;
        Formula::or([
            Formula::and([Formula::var(var.clone()), high]),
            Formula::and([Formula::lit(var, false), low]),
        ])
    } else {
        formula.clone()
    };
    cache.insert(formula.clone(), compiled.clone());
    Ok(compiled)
}

/// Operands of a conjunction grouped into variable-disjoint components,
/// in order of their first operand. Anything else is one component.
pub(crate) fn components(formula: &Formula) -> Vec<Formula> {
    let Formula::And(ops) = formula else {
        return vec![formula.clone()];
    };
    let mut groups = UnionFind::new(ops.len());
    let mut owner: HashMap<String, usize> = HashMap::new();
    for (i, op) in ops.iter().enumerate() {
        for name in op.variables() {
            match owner.get(&name) {
                Some(&j) => groups.union(i, j),
                None => {
                    owner.insert(name, i);
                }
            }
        }
    }
    let mut grouped: Vec<(usize, Vec<Formula>)> = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        let root = groups.find(i);
        match grouped.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(op.clone()),
            None => grouped.push((root, vec![op.clone()])),
        }
    }
    grouped
        .into_iter()
        .map(|(_, members)| Formula::and(members))
        .collect()
}

/// Most frequent variable, ties broken by first occurrence.
pub(crate) fn branch_variable(formula: &Formula) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    formula.visit_literals(&mut |l| *counts.entry(l.name.clone()).or_insert(0) += 1);
    let mut best: Option<(String, usize)> = None;
    for name in formula.variables() {
        let count = counts.get(&name).copied().unwrap_or(0);
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name)
}

/// `formula` with `var` fixed to `value`.
pub(crate) fn cofactor(formula: &Formula, var: &str, value: bool) -> Formula {
    restrict(formula, &Assignment::from_pairs([(var, value)]))
}

/// Disjoint sets over `0..n` with path halving.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // the smaller index stays the root
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}
