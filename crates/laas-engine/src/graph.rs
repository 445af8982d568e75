// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Constraint graphs, formula graphs and connected components of formula
//! sets.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::dnnf::UnionFind;
use crate::formula::Formula;
use crate::sat::variables_of;

/// Output syntax of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Mermaid,
    Graphviz,
}

/// Undirected graph with one node per variable and an edge between every
/// two variables occurring in the same formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintGraph {
    /// Variable names in order of first occurrence; the index is the node id.
    pub nodes: Vec<String>,
    /// Node id pairs, smaller id first, in order of discovery.
    pub edges: Vec<(usize, usize)>,
}

/// Build the constraint graph of `formulas`.
pub fn constraint_graph(formulas: &[Formula]) -> ConstraintGraph {
    let nodes = variables_of(formulas);
    let id: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for formula in formulas {
        let vars: Vec<usize> = formula.variables().iter().map(|v| id[v.as_str()]).collect();
        for (i, &a) in vars.iter().enumerate() {
            for &b in &vars[i + 1..] {
                let edge = (a.min(b), a.max(b));
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
    }
    ConstraintGraph { nodes, edges }
}

/// Text rendering of a constraint graph.
pub fn render(graph: &ConstraintGraph, format: GraphFormat) -> String {
    let mut out = String::new();
    match format {
        GraphFormat::Mermaid => {
            out.push_str("graph LR\n");
            for (i, name) in graph.nodes.iter().enumerate() {
                let _ = writeln!(out, "  id{i}[\"{name}\"]");
            }
            for (a, b) in &graph.edges {
                let _ = writeln!(out, "  id{a} --- id{b}");
            }
        }
        GraphFormat::Graphviz => {
            out.push_str("strict graph {\n");
            for (i, name) in graph.nodes.iter().enumerate() {
                let _ = writeln!(out, "  id{i} [shape=ellipse, label=\"{name}\"]");
            }
            for (a, b) in &graph.edges {
                let _ = writeln!(out, "  id{a} -- id{b}");
            }
            out.push_str("}\n");
        }
    }
    out
}

/// Node sharing of a [`FormulaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaGraphType {
    /// Equal subformulas share one node.
    Dag,
    /// One node per occurrence.
    Ast,
}

/// Directed graph of a formula's syntax, edges from operator to operand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaGraph {
    /// Node labels; the root is node 0.
    pub nodes: Vec<String>,
    /// (parent, child) pairs in operand order.
    pub edges: Vec<(usize, usize)>,
}

impl FormulaGraph {
    fn is_leaf(&self, node: usize) -> bool {
        !self.edges.iter().any(|(parent, _)| *parent == node)
    }
}

/// Build the syntax graph of `formula`.
pub fn formula_graph(formula: &Formula, kind: FormulaGraphType) -> FormulaGraph {
    let mut builder = FormulaGraphBuilder {
        graph: FormulaGraph::default(),
        shared: HashMap::new(),
        kind,
    };
    builder.node(formula);
    builder.graph
}

struct FormulaGraphBuilder<'a> {
    graph: FormulaGraph,
    shared: HashMap<&'a Formula, usize>,
    kind: FormulaGraphType,
}

impl<'a> FormulaGraphBuilder<'a> {
    fn node(&mut self, formula: &'a Formula) -> usize {
        if self.kind == FormulaGraphType::Dag {
            if let Some(&id) = self.shared.get(formula) {
                return id;
            }
        }
        let id = self.graph.nodes.len();
        self.graph.nodes.push(operator_label(formula));
        if self.kind == FormulaGraphType::Dag {
            self.shared.insert(formula, id);
        }
        let operands: Vec<&'a Formula> = match formula {
            Formula::Not(op) => vec![op],
            Formula::Impl(l, r) | Formula::Equiv(l, r) => vec![l, r],
            Formula::And(ops) | Formula::Or(ops) => ops.iter().collect(),
            _ => Vec::new(),
        };
        for operand in operands {
            let child = self.node(operand);
            self.graph.edges.push((id, child));
        }
        id
    }
}

fn operator_label(formula: &Formula) -> String {
    match formula {
        Formula::Not(_) => "~".to_string(),
        Formula::Impl(..) => "=>".to_string(),
        Formula::Equiv(..) => "<=>".to_string(),
        Formula::And(_) => "&".to_string(),
        Formula::Or(_) => "|".to_string(),
        leaf => leaf.to_string(),
    }
}

/// Text rendering of a formula graph. Operators are boxes, operands
/// without children are ellipses.
pub fn render_formula_graph(graph: &FormulaGraph, format: GraphFormat) -> String {
    let mut out = String::new();
    match format {
        GraphFormat::Mermaid => {
            out.push_str("graph TD\n");
            for (i, label) in graph.nodes.iter().enumerate() {
                if graph.is_leaf(i) {
                    let _ = writeln!(out, "  id{i}([\"{label}\"])");
                } else {
                    let _ = writeln!(out, "  id{i}[\"{label}\"]");
                }
            }
            for (a, b) in &graph.edges {
                let _ = writeln!(out, "  id{a} --> id{b}");
            }
        }
        GraphFormat::Graphviz => {
            out.push_str("digraph G {\n");
            for (i, label) in graph.nodes.iter().enumerate() {
                let shape = if graph.is_leaf(i) { "ellipse" } else { "box" };
                let _ = writeln!(out, "  id{i} [shape={shape}, label=\"{label}\"]");
            }
            for (a, b) in &graph.edges {
                let _ = writeln!(out, "  id{a} -> id{b}");
            }
            out.push_str("}\n");
        }
    }
    out
}

/// Indices of `formulas` grouped by shared variables, groups ordered by
/// their first member. Formulas without variables stand alone.
pub fn components(formulas: &[Formula]) -> Vec<Vec<usize>> {
    let mut groups = UnionFind::new(formulas.len());
    let mut owner: HashMap<String, usize> = HashMap::new();
    for (i, formula) in formulas.iter().enumerate() {
        for name in formula.variables() {
            match owner.get(&name) {
                Some(&j) => groups.union(i, j),
                None => {
                    owner.insert(name, i);
                }
            }
        }
    }
    let mut out: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..formulas.len() {
        let root = groups.find(i);
        match out.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(i),
            None => out.push((root, vec![i])),
        }
    }
    out.into_iter().map(|(_, members)| members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_all;

    fn formulas(texts: &[&str]) -> Vec<Formula> {
        parse_all(texts.iter().copied()).unwrap()
    }

    #[test]
    fn test_constraint_graph() {
        let graph = constraint_graph(&formulas(&["A | B", "B & C", "A => B"]));
        assert_eq!(graph.nodes, vec!["A", "B", "C"]);
        assert_eq!(graph.edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_render_mermaid() {
        let graph = constraint_graph(&formulas(&["A | B"]));
        assert_eq!(
            render(&graph, GraphFormat::Mermaid),
            "graph LR\n  id0[\"A\"]\n  id1[\"B\"]\n  id0 --- id1\n"
        );
    }

    #[test]
    fn test_render_graphviz() {
        let graph = constraint_graph(&formulas(&["A"]));
        assert_eq!(
            render(&graph, GraphFormat::Graphviz),
            "strict graph {\n  id0 [shape=ellipse, label=\"A\"]\n}\n"
        );
    }

    #[test]
    fn test_formula_graph_shares_subformulas() {
        let f = crate::parser::parse("(A | B) & (A | B => C)").unwrap();
        let dag = formula_graph(&f, FormulaGraphType::Dag);
        assert_eq!(dag.nodes, vec!["&", "|", "A", "B", "=>", "C"]);
        assert_eq!(dag.edges, vec![(1, 2), (1, 3), (0, 1), (4, 1), (4, 5), (0, 4)]);
        let ast = formula_graph(&f, FormulaGraphType::Ast);
        assert_eq!(ast.nodes, vec!["&", "|", "A", "B", "=>", "|", "A", "B", "C"]);
        assert_eq!(ast.edges.len(), 8);
    }

    #[test]
    fn test_render_formula_graph() {
        let f = crate::parser::parse("~A & B").unwrap();
        let graph = formula_graph(&f, FormulaGraphType::Dag);
        assert_eq!(
            render_formula_graph(&graph, GraphFormat::Mermaid),
            "graph TD\n  id0[\"&\"]\n  id1([\"~A\"])\n  id2([\"B\"])\n  \
             id0 --> id1\n  id0 --> id2\n"
        );
        assert_eq!(
            render_formula_graph(&graph, GraphFormat::Graphviz),
            "digraph G {\n  id0 [shape=box, label=\"&\"]\n  id1 [shape=ellipse, label=\"~A\"]\n  \
             id2 [shape=ellipse, label=\"B\"]\n  id0 -> id1\n  id0 -> id2\n}\n"
        );
    }

    #[test]
    fn test_components() {
        let fs = formulas(&["A | B", "C", "B & D", "$true", "C | E"]);
        assert_eq!(components(&fs), vec![vec![0, 2], vec![1, 4], vec![3]]);
    }
}
