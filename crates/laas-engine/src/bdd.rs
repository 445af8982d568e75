// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Reduced ordered binary decision diagrams.
//!
//! Variables are ordered by first occurrence in the compiled formula. Nodes
//! live in one arena per [`Bdd`] and are hash-consed, so two equal
//! functions always have the same node id.
//!
//! The apply recursion descends one level per variable, which bounds the
//! variable count to [`MAX_VARIABLES`].

use std::collections::{HashMap, HashSet};

use crate::clause::Clause;
use crate::counting::{overflow, scale};
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Literal};
use crate::normalform::nnf;

/// Most variables a formula may have to be compiled.
pub const MAX_VARIABLES: usize = 1024;

type NodeId = usize;

const FALSE: NodeId = 0;
const TRUE: NodeId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    /// Position in the variable order; terminals use the order's length.
    level: usize,
    low: NodeId,
    high: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    And,
    Or,
}

/// A compiled formula.
pub struct Bdd<'a> {
    order: Vec<String>,
    nodes: Vec<Node>,
    unique: HashMap<Node, NodeId>,
    cache: HashMap<(Op, NodeId, NodeId), NodeId>,
    negations: HashMap<NodeId, NodeId>,
    root: NodeId,
    deadline: &'a Deadline,
}

impl<'a> Bdd<'a> {
    /// Compile `formula`. PB constraints are expanded first.
    pub fn compile(formula: &Formula, deadline: &'a Deadline) -> Result<Self> {
        let order = formula.variables();
        if order.len() > MAX_VARIABLES {
            return Err(EngineError::rejected(format!(
                "BDD compilation supports at most {MAX_VARIABLES} variables"
            )));
        }
        let terminal = Node {
            level: order.len(),
            low: FALSE,
            high: FALSE,
        };
        let mut bdd = Self {
            order,
            nodes: vec![terminal, terminal],
            unique: HashMap::new(),
            cache: HashMap::new(),
            negations: HashMap::new(),
            root: FALSE,
            deadline,
        };
        let index: HashMap<String, usize> = bdd
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        bdd.root = bdd.build(formula, &index)?;
        Ok(bdd)
    }

    /// Number of internal nodes.
    pub fn size(&self) -> usize {
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if id > TRUE && seen.insert(id) {
                stack.push(self.nodes[id].low);
                stack.push(self.nodes[id].high);
            }
        }
        seen.len()
    }

    fn build(&mut self, formula: &Formula, index: &HashMap<String, usize>) -> Result<NodeId> {
        self.deadline.check()?;
        Ok(match formula {
            Formula::True => TRUE,
            Formula::False => FALSE,
            Formula::Lit(l) => {
                let level = index[&l.name];
                if l.phase {
                    self.node(level, FALSE, TRUE)
                } else {
                    self.node(level, TRUE, FALSE)
                }
            }
            Formula::Not(op) => {
                let inner = self.build(op, index)?;
                self.not(inner)?
            }
            Formula::Impl(a, b) => {
                let a = self.build(a, index)?;
                let not_a = self.not(a)?;
                let b = self.build(b, index)?;
                self.apply(Op::Or, not_a, b)?
            }
            Formula::Equiv(a, b) => {
                let a = self.build(a, index)?;
                let b = self.build(b, index)?;
                let both = self.apply(Op::And, a, b)?;
                let (not_a, not_b) = (self.not(a)?, self.not(b)?);
                let neither = self.apply(Op::And, not_a, not_b)?;
                self.apply(Op::Or, both, neither)?
            }
            Formula::And(ops) => self.fold(Op::And, ops, TRUE, index)?,
            Formula::Or(ops) => self.fold(Op::Or, ops, FALSE, index)?,
            Formula::Pbc(_) => self.build(&nnf(formula), index)?,
        })
    }

    fn fold(
        &mut self,
        op: Op,
        operands: &[Formula],
        unit: NodeId,
        index: &HashMap<String, usize>,
    ) -> Result<NodeId> {
        let mut acc = unit;
        for operand in operands {
            let next = self.build(operand, index)?;
            acc = self.apply(op, acc, next)?;
        }
        Ok(acc)
    }

    fn node(&mut self, level: usize, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            return low;
        }
        let node = Node { level, low, high };
        if let Some(&id) = self.unique.get(&node) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(node);
        self.unique.insert(node, id);
        id
    }

    fn not(&mut self, u: NodeId) -> Result<NodeId> {
        match u {
            FALSE => return Ok(TRUE),
            TRUE => return Ok(FALSE),
            _ => {}
        }
        if let Some(&hit) = self.negations.get(&u) {
            return Ok(hit);
        }
        self.deadline.check()?;
        let Node { level, low, high } = self.nodes[u];
        let low = self.not(low)?;
        let high = self.not(high)?;
        let result = self.node(level, low, high);
        self.negations.insert(u, result);
        Ok(result)
    }

    fn apply(&mut self, op: Op, u: NodeId, v: NodeId) -> Result<NodeId> {
        match (op, u, v) {
            (Op::And, FALSE, _) | (Op::And, _, FALSE) => return Ok(FALSE),
            (Op::Or, TRUE, _) | (Op::Or, _, TRUE) => return Ok(TRUE),
            (Op::And, TRUE, x) | (Op::And, x, TRUE) => return Ok(x),
            (Op::Or, FALSE, x) | (Op::Or, x, FALSE) => return Ok(x),
            _ if u == v => return Ok(u),
            _ => {}
        }
        let key = (op, u.min(v), u.max(v));
        if let Some(&hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        self.deadline.check()?;
        let (a, b) = (self.nodes[u], self.nodes[v]);
        let level = a.level.min(b.level);
        let (a_low, a_high) = if a.level == level { (a.low, a.high) } else { (u, u) };
        let (b_low, b_high) = if b.level == level { (b.low, b.high) } else { (v, v) };
        let low = self.apply(op, a_low, b_low)?;
        let high = self.apply(op, a_high, b_high)?;
        let result = self.node(level, low, high);
        self.cache.insert(key, result);
        Ok(result)
    }

    /// Quantify away every variable not in `keep`.
    pub fn project(&mut self, keep: &[String]) -> Result<()> {
        let keep: HashSet<usize> = self
            .order
            .iter()
            .enumerate()
            .filter(|(_, name)| keep.contains(name))
            .map(|(i, _)| i)
            .collect();
        let mut memo = HashMap::new();
        self.root = self.exists(self.root, &keep, &mut memo)?;
        Ok(())
    }

    fn exists(
        &mut self,
        u: NodeId,
        keep: &HashSet<usize>,
        memo: &mut HashMap<NodeId, NodeId>,
    ) -> Result<NodeId> {
        if u <= TRUE {
            return Ok(u);
        }
        if let Some(&hit) = memo.get(&u) {
            return Ok(hit);
        }
        self.deadline.check()?;
        let Node { level, low, high } = self.nodes[u];
        let low = self.exists(low, keep, memo)?;
        let high = self.exists(high, keep, memo)?;
        let result = if keep.contains(&level) {
            self.node(level, low, high)
        } else {
            self.apply(Op::Or, low, high)?
        };
        memo.insert(u, result);
        Ok(result)
    }

    /// Models over `width` counted variables. `ranks` maps each order
    /// position to its rank among them.
    fn count_over(&self, ranks: &[usize], width: usize) -> Result<u128> {
        let rank = |u: NodeId| {
            let level = self.nodes[u].level;
            if level >= ranks.len() { width } else { ranks[level] }
        };
        let mut memo: HashMap<NodeId, u128> = HashMap::new();
        let mut stack = vec![(self.root, false)];
        while let Some((u, expanded)) = stack.pop() {
            if u <= TRUE || memo.contains_key(&u) {
                continue;
            }
            let Node { low, high, .. } = self.nodes[u];
            if !expanded {
                self.deadline.check()?;
                stack.push((u, true));
                stack.push((low, false));
                stack.push((high, false));
                continue;
            }
            let mut total: u128 = 0;
            for child in [low, high] {
                let below = match child {
                    FALSE => 0,
                    TRUE => 1,
                    _ => memo[&child],
                };
                let part = scale(below, rank(child) - rank(u) - 1)?;
                total = total.checked_add(part).ok_or_else(overflow)?;
            }
            memo.insert(u, total);
        }
        let top = match self.root {
            FALSE => 0,
            TRUE => 1,
            root => memo[&root],
        };
        scale(top, rank(self.root))
    }

    /// Number of models over the variables of the compiled formula.
    pub fn model_count(&self) -> Result<u128> {
        let ranks: Vec<usize> = (0..self.order.len()).collect();
        self.count_over(&ranks, self.order.len())
    }

    /// Number of assignments to `variables` that extend to a model. Call
    /// after [`Bdd::project`] with the same variables.
    pub fn projected_count(&self, variables: &[String]) -> Result<u128> {
        let mut ranks = Vec::with_capacity(self.order.len());
        let mut next = 0;
        for name in &self.order {
            ranks.push(next);
            if variables.contains(name) {
                next += 1;
            }
        }
        let known: HashSet<&String> = self.order.iter().collect();
        let free = variables.iter().filter(|v| !known.contains(v)).count();
        scale(self.count_over(&ranks, next)?, free)
    }

    /// One clause per path to the false terminal.
    pub fn cnf_clauses(&self) -> Result<Vec<Clause>> {
        Ok(self
            .paths(FALSE)?
            .into_iter()
            .map(|path| path.iter().map(Literal::negate).collect())
            .collect())
    }

    /// One term per path to the true terminal.
    pub fn dnf_terms(&self) -> Result<Vec<Vec<Literal>>> {
        self.paths(TRUE)
    }

    fn paths(&self, terminal: NodeId) -> Result<Vec<Vec<Literal>>> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Vec<Literal>)> = vec![(self.root, Vec::new())];
        while let Some((u, path)) = stack.pop() {
            self.deadline.check()?;
            if u <= TRUE {
                if u == terminal {
                    out.push(path);
                }
                continue;
            }
            let Node { level, low, high } = self.nodes[u];
            let name = &self.order[level];
            let mut high_path = path.clone();
            high_path.push(Literal::new(name.clone(), true));
            let mut low_path = path;
            low_path.push(Literal::new(name.clone(), false));
            stack.push((low, low_path));
            stack.push((high, high_path));
        }
        Ok(out)
    }
}
