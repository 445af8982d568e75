// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request decoding and result envelope writing.
//!
//! Every handler takes an [`Exchange`], decodes its input through it and
//! hands back a `Result<T, ServiceError>`. [`Exchange::reply`] turns either
//! side into a response in the media type the client accepts, recording
//! failures in the request's [`RequestContext`].
//!
//! Extraction failures answer with the envelope too: a query string that
//! cannot be read fails [`Exchange`] extraction and a body that cannot be
//! buffered fails [`RequestBody`] extraction, both as illegal input.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Deref;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::{HeaderName, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use laas_protocol::{
    ComputationResult, ComputationState, EncodeError, ServiceInput, ServiceOutput, WireMessage,
    decode_request, encode_response,
};
use tracing::error;

use crate::context::RequestContext;
use crate::error::{Result, ServiceError};

const UNSUPPORTED_ACCEPT_BODY: &str = "Unsupported accept type";
const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Negotiation data of one request plus its context.
#[derive(Debug, Clone)]
pub struct Exchange {
    context: RequestContext,
    path: String,
    content_type: Option<String>,
    accept: Option<String>,
    query: HashMap<String, String>,
}

impl<S> FromRequestParts<S> for Exchange
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let mut exchange = Self {
            context: parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
            path: parts.uri.path().to_string(),
            content_type: header_value(parts, header::CONTENT_TYPE),
            accept: header_value(parts, header::ACCEPT),
            query: HashMap::new(),
        };
        match query_params(&parts.uri) {
            Ok(query) => {
                exchange.query = query;
                Ok(exchange)
            }
            Err(err) => Err(exchange.fail(err)),
        }
    }
}

/// Query parameters by name. Repeating a name is illegal input.
fn query_params(uri: &Uri) -> Result<HashMap<String, String>> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|rejection| {
        ServiceError::illegal_input(format!("illegal query string: {}", rejection.body_text()))
    })?;
    let mut query = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        match query.entry(name) {
            Entry::Occupied(entry) => {
                return Err(ServiceError::illegal_input(format!(
                    "duplicate query parameter '{}'",
                    entry.key()
                )));
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    Ok(query)
}

/// Buffered request body.
#[derive(Debug, Clone)]
pub struct RequestBody(Bytes);

impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let exchange = Exchange::from_request_parts(&mut parts, state).await?;
        Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map(Self)
            .map_err(|rejection| {
                exchange.fail(ServiceError::illegal_input(format!(
                    "could not read request body: {}",
                    rejection.body_text()
                )))
            })
    }
}

impl Deref for RequestBody {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

fn header_value(parts: &Parts, name: HeaderName) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

impl Exchange {
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameter, `None` when absent or empty.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// [`ServiceError::UnknownPath`] for this request.
    pub fn unknown_path(&self) -> ServiceError {
        ServiceError::UnknownPath(self.path.clone())
    }

    /// Decode and validate the request body.
    pub fn decode<T: ServiceInput>(&self, body: &[u8]) -> Result<T> {
        Ok(decode_request(body, self.content_type.as_deref())?)
    }

    /// Write the outcome of a handler.
    pub fn reply<T: ServiceOutput>(&self, outcome: Result<T>) -> Response {
        match outcome {
            Ok(mut result) => {
                result.set_state(ComputationState::success());
                self.encode(StatusCode::OK, &result)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Write a failure envelope.
    pub fn fail(&self, err: ServiceError) -> Response {
        if let ServiceError::Internal { detail } = &err {
            error!(
                correlation_id = %self.context.correlation_id(),
                path = %self.path,
                error = %detail,
                "Internal error"
            );
        }
        let message = err.to_string();
        self.context.record_failure(message.clone());
        self.encode(err.status(), &ComputationResult::failure(message))
    }

    /// Encoding failures bypass the envelope and answer in plain text.
    fn encode<T: WireMessage>(&self, status: StatusCode, value: &T) -> Response {
        match encode_response(value, self.accept.as_deref()) {
            Ok((media, body)) => {
                (status, [(header::CONTENT_TYPE, media.as_str())], body).into_response()
            }
            Err(EncodeError::UnsupportedAccept(accept)) => {
                self.context
                    .record_failure(ServiceError::UnsupportedAccept(accept).to_string());
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, UNSUPPORTED_ACCEPT_BODY).into_response()
            }
            Err(err) => {
                error!(
                    correlation_id = %self.context.correlation_id(),
                    path = %self.path,
                    error = %err,
                    "Failed to encode result"
                );
                self.context
                    .record_failure(ServiceError::internal(err).to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use laas_protocol::BoolResult;

    async fn exchange(uri: &str, accept: Option<&str>) -> Exchange {
        let mut builder = Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Exchange::from_request_parts(&mut parts, &()).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_query_params() {
        let exchange = exchange("/encoding/cc?algorithm=ladder&prefix=", None).await;
        assert_eq!(exchange.path(), "/encoding/cc");
        assert_eq!(exchange.param("algorithm"), Some("ladder"));
        assert_eq!(exchange.param("prefix"), None);
        assert_eq!(exchange.param("missing"), None);
    }

    #[tokio::test]
    async fn test_duplicate_query_param_is_illegal_input() {
        let (mut parts, _) = Request::builder()
            .uri("/encoding/cc?algorithm=ladder&algorithm=binary")
            .body(())
            .unwrap()
            .into_parts();
        let response = Exchange::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            body_text(response)
                .await
                .contains("\"error\": \"illegal input: duplicate query parameter 'algorithm'\"")
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_illegal_input() {
        let request = Request::builder()
            .uri("/formula/depth")
            .body(axum::body::Body::from(vec![b' '; 3 * 1024 * 1024]))
            .unwrap();
        let response = RequestBody::from_request(request, &()).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("illegal input: could not read request body"), "{body}");
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let exchange = exchange("/x", Some("application/json")).await;
        let response = exchange.reply(Ok(BoolResult::new(true)));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(body_text(response).await.contains("\"value\": true"));
        assert!(exchange.context().state().success);
    }

    #[tokio::test]
    async fn test_failure_envelope_records_state() {
        let exchange = exchange("/x", None).await;
        let response = exchange.reply::<BoolResult>(Err(ServiceError::Timeout));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("\"error\": \"computation timeout reached\""));
        assert!(!body.contains("value"));
        assert_eq!(exchange.context().state().error, "computation timeout reached");
    }

    #[tokio::test]
    async fn test_unsupported_accept_is_plain_text() {
        let exchange = exchange("/x", Some("text/html")).await;
        let response = exchange.reply(Ok(BoolResult::new(true)));
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_text(response).await, "Unsupported accept type");
        assert_eq!(exchange.context().state().error, "unsupported accept: text/html");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let exchange = exchange("/x", None).await;
        let response = exchange.reply::<BoolResult>(Err(ServiceError::internal("secret detail")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("internal error"));
        assert!(!body.contains("secret detail"));
    }
}
