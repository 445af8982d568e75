// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tests for routing, negotiation and the result envelope.

mod common;

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::*;
use laas_protocol::{FormulaInput, FormulaItem, SatResult, WireMessage};
use serde_json::json;

// ============================================================================
// Envelope
// ============================================================================

#[tokio::test]
async fn test_success_envelope_has_state_and_payload() {
    let app = app();
    let response = post_json(&app, "/formula/variables", formulas(&["B & A", "C"])).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
    let body = response.json();
    assert_eq!(body["state"]["success"], true);
    assert!(body["state"].get("error").is_none());
    assert_eq!(strings(&body["values"]), ["A", "B", "C"]);
}

#[tokio::test]
async fn test_json_output_is_stable() {
    let app = app();
    let request = || formulas(&["A & B | C"]);
    let first = post_json(&app, "/formula/lit-profile", request()).await;
    let second = post_json(&app, "/formula/lit-profile", request()).await;
    assert_eq!(first.body, second.body);
    assert!(first.text().ends_with('\n'));
}

#[tokio::test]
async fn test_validation_failure_is_bad_request() {
    let app = app();
    let response = post_json(&app, "/solver/sat", json!({ "formulas": [] })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["state"]["success"], false);
    assert_eq!(
        body["state"]["error"],
        "illegal input: validation errors [field 'formulas': empty list]"
    );
    assert!(body.get("satisfiable").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .body(Body::from("{\"formulas\": ["))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().starts_with("illegal input: "));
}

#[tokio::test]
async fn test_unparsable_formula_is_bad_request() {
    let app = app();
    let response = post_json(&app, "/solver/sat", formulas(&["A &"])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "illegal input: could not parse formula 'A &'");
}

// ============================================================================
// Negotiation
// ============================================================================

#[tokio::test]
async fn test_protobuf_round_trip() {
    let app = app();
    let input = FormulaInput {
        formulas: vec![FormulaItem::new("A"), FormulaItem::new("~A | E")],
    };
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .header(header::CONTENT_TYPE, "application/protobuf")
        .header(header::ACCEPT, "application/protobuf")
        .body(Body::from(input.encode_binary()))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/protobuf");
    let result = SatResult::decode_binary(&response.body).unwrap();
    assert!(result.state.unwrap().success);
    assert!(result.satisfiable);
    assert_eq!(result.model, ["A", "E"]);
}

#[tokio::test]
async fn test_json_parameters_are_ignored_in_content_type() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/formula/atoms")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .header(header::ACCEPT, "*/*")
        .body(Body::from(formulas(&["A & B | ~A"]).to_string()))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["value"], 3);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("A"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.error(), "unsupported content-type text/plain");
}

#[tokio::test]
async fn test_unsupported_accept_is_plain_text() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .header(header::ACCEPT, "text/html")
        .body(Body::from(formulas(&["A"]).to_string()))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.text(), "Unsupported accept type");
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = app();
    let response = post_json(&app, "/solver/smus", formulas(&["A"])).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "unknown path: /solver/smus");
}

#[tokio::test]
async fn test_unknown_sub_resource_is_not_found() {
    let app = app();
    for path in [
        "/formula/width",
        "/normalform/transformation/bdd",
        "/normalform/predicate/bdd",
        "/simplification/qmc",
        "/solver/predicate/prime",
        "/assignment/projection",
        "/encoding/amo",
    ] {
        let response = post_json(&app, path, formulas(&["A"])).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.error(), format!("unknown path: {path}"));
    }
    let response = get(&app, "/randomizer/bdd").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_not_found() {
    let app = app();
    let response = get(&app, "/solver/sat").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "unknown path: /solver/sat");
}

#[tokio::test]
async fn test_unknown_algorithm_is_bad_request() {
    let app = app();
    let cases = [
        ("/encoding/cc?algorithm=sequential", "unknown cc algorithm 'sequential'"),
        ("/encoding/pbc?algorithm=adder", "unknown pbc algorithm 'adder'"),
        ("/explanation/mus?algorithm=quick", "unknown mus algorithm 'quick'"),
        ("/normalform/transformation/cnf?algorithm=obdd", "unknown cnf algorithm 'obdd'"),
        ("/normalform/transformation/dnf?algorithm=qmc", "unknown dnf algorithm 'qmc'"),
        ("/model/counting?algorithm=sdd", "unknown counting algorithm 'sdd'"),
        (
            "/model/counting/projection?algorithm=dnnf",
            "unknown projected counting algorithm 'dnnf'",
        ),
        (
            "/prime/minimal-cover?algorithm=any",
            "unknown prime implicant cover algorithm 'any'",
        ),
        ("/graph/constraint/graphical?format=dot", "unknown output format 'dot'"),
        ("/formula/graphical?type=tree", "unknown graph type 'tree'"),
    ];
    for (uri, message) in cases {
        let response = post_json(&app, uri, formulas(&["A + B <= 1"])).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.error(), format!("illegal input: {message}"));
    }
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = get(&app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

// ============================================================================
// Request context
// ============================================================================

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .header("x-correlation-id", "req-42")
        .body(Body::from(formulas(&["A"]).to_string()))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.headers["x-correlation-id"], "req-42");
}

#[tokio::test]
async fn test_correlation_id_is_issued() {
    let app = app();
    let first = post_json(&app, "/solver/sat", formulas(&["A"])).await;
    let second = get(&app, "/solver/unknown").await;

    let first_id = first.headers["x-correlation-id"].to_str().unwrap();
    let second_id = second.headers["x-correlation-id"].to_str().unwrap();
    assert_eq!(first_id.len(), 36);
    assert_ne!(first_id, second_id);
}

// ============================================================================
// Timeout
// ============================================================================

#[tokio::test]
async fn test_timeout_has_no_payload() {
    let app = app_with_timeout(Duration::ZERO);
    let response = post_json(&app, "/solver/sat", formulas(&["A"])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["state"]["success"], false);
    assert_eq!(body["state"]["error"], "computation timeout reached");
    assert!(body.get("satisfiable").is_none());
    assert!(body.get("model").is_none());
}

#[tokio::test]
async fn test_timeout_applies_to_every_family() {
    let app = app_with_timeout(Duration::ZERO);
    for path in ["/formula/depth", "/normalform/transformation/cnf", "/model/counting"] {
        let response = post_json(&app, path, formulas(&["A | B"])).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.error(), "computation timeout reached");
    }
    let response = get(&app, "/randomizer/formula?seed=1").await;
    assert_eq!(response.error(), "computation timeout reached");
}

#[tokio::test]
async fn test_timeout_answers_while_encoding_runs() {
    let app = app_with_timeout(Duration::from_millis(50));
    let started = Instant::now();
    let response = post_json(
        &app,
        "/encoding/pbc",
        formulas(&["100003*A + 150001*B + 200003*C <= 250007"]),
    )
    .await;
    let elapsed = started.elapsed();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["state"]["error"], "computation timeout reached");
    assert!(body.get("formulas").is_none());
    assert!(elapsed < Duration::from_secs(2), "answered after {elapsed:?}");
}

// ============================================================================
// Limits
// ============================================================================

#[tokio::test]
async fn test_deep_nesting_is_bad_request() {
    let app = app();
    let deep = format!("{}A{}", "(".repeat(200_000), ")".repeat(200_000));
    let response = post_json(&app, "/formula/depth", formulas(&[deep.as_str()])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "illegal input: formula is nested deeper than 128 levels"
    );

    let negations = format!("{}A", "~".repeat(200_000));
    let response = post_json(&app, "/solver/sat", formulas(&[negations.as_str()])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_randomizer_depth_is_capped() {
    let app = app();
    let response = get(&app, "/randomizer/not?seed=1&depth=5000000").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "illegal input: illegal depth value '5000000', at most 32 is supported"
    );
}

#[tokio::test]
async fn test_coefficients_beyond_range_are_bad_request() {
    let app = app();
    let request = json!({
        "formulas": [{ "formula": "9223372036854775807*A + 9223372036854775807*B <= 0" }],
        "assignment": {
            "mapping": [
                { "variable": "A", "value": true },
                { "variable": "B", "value": true },
            ]
        },
    });
    let response = post_json(&app, "/assignment/evaluation", request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "illegal input: pseudo-Boolean constraint exceeds the coefficient range of \
         2305843009213693951"
    );

    let response = post_json(
        &app,
        "/solver/sat",
        formulas(&["2*A + B >= -9223372036854775808"]),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().starts_with("illegal input: "));
}

#[tokio::test]
async fn test_duplicate_query_parameter_is_bad_request() {
    let app = app();
    let response = post_json(&app, "/solver/sat?core=true&core=false", formulas(&["A"])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.error(),
        "illegal input: duplicate query parameter 'core'"
    );
}

#[tokio::test]
async fn test_oversized_body_has_envelope() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/solver/sat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; 3 * 1024 * 1024]))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
    let body = response.json();
    assert_eq!(body["state"]["success"], false);
    assert!(
        response
            .error()
            .starts_with("illegal input: could not read request body"),
        "{}",
        response.error()
    );
}
