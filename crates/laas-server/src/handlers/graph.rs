// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/graph/constraint`, `/graph/constraint/graphical` and `/graph/components`.
//!
//! Graphs are built over all input items; no conjunction is formed.

use axum::extract::State;
use axum::response::Response;
use laas_engine::graph::{self, ConstraintGraph};
use laas_protocol::{ComponentResult, GraphEdge, GraphNode, GraphResult, StringResult};

use super::{AppState, on_items};
use crate::dispatch::GRAPH_FORMAT;
use crate::envelope::{Exchange, RequestBody};
use crate::error::Result;

pub async fn constraint(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_items(&app, &exchange, &body, |_, formulas, _| {
        Ok(graph_result(&graph::constraint_graph(&formulas)))
    })
    .await;
    exchange.reply(outcome)
}

pub async fn graphical(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    exchange.reply(render(&app, &exchange, &body).await)
}

pub async fn components(
    State(app): State<AppState>,
    exchange: Exchange,
    body: RequestBody,
) -> Response {
    let outcome = on_items(&app, &exchange, &body, |items, formulas, _| {
        Ok(ComponentResult::new(
            graph::components(&formulas)
                .into_iter()
                .map(|component| component.into_iter().map(|i| items[i].clone()).collect())
                .collect(),
        ))
    })
    .await;
    exchange.reply(outcome)
}

async fn render(app: &AppState, exchange: &Exchange, body: &[u8]) -> Result<StringResult> {
    let format = GRAPH_FORMAT.resolve(exchange.param(GRAPH_FORMAT.parameter()))?;
    on_items(app, exchange, body, move |_, formulas, _| {
        Ok(StringResult::new(graph::render(
            &graph::constraint_graph(&formulas),
            format,
        )))
    })
    .await
}

fn graph_result(graph: &ConstraintGraph) -> GraphResult {
    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(id, name)| GraphNode {
            id: id as i32,
            label: name.clone(),
        })
        .collect();
    let edges = graph
        .edges
        .iter()
        .map(|&(src, dest)| GraphEdge {
            src_id: src as i32,
            dest_id: dest as i32,
            label: String::new(),
        })
        .collect();
    GraphResult::new(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_result_ids_follow_node_order() {
        let formulas = laas_engine::parse_all(["A & B", "B | C"]).unwrap();
        let result = graph_result(&graph::constraint_graph(&formulas));
        let labels: Vec<_> = result.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        let edges: Vec<_> = result.edges.iter().map(|e| (e.src_id, e.dest_id)).collect();
        assert_eq!(edges, [(0, 1), (1, 2)]);
    }
}
