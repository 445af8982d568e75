// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP router.

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    AppState, assignment, encoding, explanation, formula, graph, health, model, normalform, prime,
    randomizer, simplification, solver, substitution, unknown_path,
};
use crate::middleware::{correlation, track_computation};

/// Build the router with every computation route.
///
/// Paths without a route, sub-resources a handler does not know and
/// requests with the wrong method all answer `unknown path` (404).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assignment/{operation}", post(assignment::assignment))
        .route("/dnnf/compilation", post(model::compilation))
        .route("/encoding/{kind}", post(encoding::encoding))
        .route("/explanation/mus", post(explanation::mus))
        .route("/explanation/smus", post(explanation::smus))
        .route("/formula/{function}", post(formula::formula))
        .route("/graph/constraint", post(graph::constraint))
        .route("/graph/constraint/graphical", post(graph::graphical))
        .route("/graph/components", post(graph::components))
        .route("/model/counting", post(model::counting))
        .route("/model/counting/projection", post(model::projection))
        .route(
            "/normalform/transformation/{form}",
            post(normalform::transformation),
        )
        .route("/normalform/predicate/{form}", post(normalform::predicate))
        .route(
            "/simplification/{kind}",
            post(simplification::simplification),
        )
        .route("/prime/minimal-implicant", post(prime::minimal_implicant))
        .route("/prime/minimal-cover", post(prime::minimal_cover))
        .route("/solver/sat", post(solver::sat))
        .route("/solver/maxsat", post(solver::maxsat))
        .route("/solver/backbone", post(solver::backbone))
        .route("/solver/predicate/{predicate}", post(solver::predicate))
        .route(
            "/substitution/anonymization",
            post(substitution::anonymization),
        )
        .route("/substitution/variables", post(substitution::variables))
        .route("/randomizer/{sort}", get(randomizer::randomizer))
        .fallback(unknown_path)
        .method_not_allowed_fallback(unknown_path)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(correlation))
                .layer(from_fn(track_computation)),
        )
        .with_state(state)
}
