// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared helpers for laas-server integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use laas_server::{AppState, Config, router};
use serde_json::Value;
use tower::ServiceExt;

/// Router with the default configuration.
pub fn app() -> Router {
    app_with_timeout(Duration::from_secs(10))
}

/// Router with a specific computation timeout.
pub fn app_with_timeout(timeout: Duration) -> Router {
    router(AppState::new(Config {
        sync_timeout: timeout,
        ..Config::default()
    }))
}

/// A collected response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is not UTF-8")
    }

    /// `state.error` of a failure envelope.
    pub fn error(&self) -> String {
        self.json()["state"]["error"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// POST a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// `{"formulas": [{"formula": ...}, ...]}`
pub fn formulas(texts: &[&str]) -> Value {
    let items: Vec<Value> = texts
        .iter()
        .map(|t| serde_json::json!({ "formula": t }))
        .collect();
    serde_json::json!({ "formulas": items })
}

/// The `formula` fields of a formula result.
pub fn result_formulas(json: &Value) -> Vec<String> {
    json["formulas"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| i["formula"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}
