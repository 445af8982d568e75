// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for laas-server.
//!
//! [`ServiceError`] is the closed set of failures a client can observe. Its
//! `Display` output is exactly the message written into the envelope's
//! `state.error` field.

use axum::http::StatusCode;
use laas_engine::EngineError;
use laas_protocol::DecodeError;
use thiserror::Error;

/// Classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownPath,
    IllegalInput,
    Timeout,
    UnsupportedContentType,
    UnsupportedAccept,
    Internal,
}

/// Failures reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// No route or sub-resource for the path.
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// Malformed body, failed validation or a rejected computation input.
    #[error("illegal input: {0}")]
    IllegalInput(String),

    /// The computation hit the synchronous timeout.
    #[error("computation timeout reached")]
    Timeout,

    /// The request body uses a media type the service cannot decode.
    #[error("unsupported content-type {0}")]
    UnsupportedContentType(String),

    /// The client accepts no media type the service can encode.
    #[error("unsupported accept: {0}")]
    UnsupportedAccept(String),

    /// Unexpected failure. The detail is logged, never sent to the client.
    #[error("internal error")]
    Internal {
        /// Diagnostic text for the server log.
        detail: String,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::IllegalInput`].
    pub fn illegal_input(message: impl Into<String>) -> Self {
        ServiceError::IllegalInput(message.into())
    }

    /// Shorthand for [`ServiceError::Internal`].
    pub fn internal(detail: impl ToString) -> Self {
        ServiceError::Internal {
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::UnknownPath(_) => ErrorKind::UnknownPath,
            ServiceError::IllegalInput(_) => ErrorKind::IllegalInput,
            ServiceError::Timeout => ErrorKind::Timeout,
            ServiceError::UnsupportedContentType(_) => ErrorKind::UnsupportedContentType,
            ServiceError::UnsupportedAccept(_) => ErrorKind::UnsupportedAccept,
            ServiceError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::UnknownPath => StatusCode::NOT_FOUND,
            ErrorKind::IllegalInput | ErrorKind::Timeout => StatusCode::BAD_REQUEST,
            ErrorKind::UnsupportedContentType | ErrorKind::UnsupportedAccept => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DecodeError> for ServiceError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedContentType(content_type) => {
                ServiceError::UnsupportedContentType(content_type)
            }
            other => ServiceError::IllegalInput(other.to_string()),
        }
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        if err.is_aborted() {
            ServiceError::Timeout
        } else {
            ServiceError::IllegalInput(err.to_string())
        }
    }
}

/// Result type using ServiceError.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_statuses() {
        let cases = [
            (
                ServiceError::UnknownPath("/solver/smus".into()),
                StatusCode::NOT_FOUND,
                "unknown path: /solver/smus",
            ),
            (
                ServiceError::illegal_input("replace must be a single variable"),
                StatusCode::BAD_REQUEST,
                "illegal input: replace must be a single variable",
            ),
            (
                ServiceError::Timeout,
                StatusCode::BAD_REQUEST,
                "computation timeout reached",
            ),
            (
                ServiceError::UnsupportedContentType("text/plain".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported content-type text/plain",
            ),
            (
                ServiceError::UnsupportedAccept("text/html".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported accept: text/html",
            ),
            (
                ServiceError::internal("worker panicked"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_engine_errors_are_classified() {
        assert_eq!(ServiceError::from(EngineError::Aborted), ServiceError::Timeout);
        let parse = laas_engine::parse("A &").unwrap_err();
        assert_eq!(
            ServiceError::from(parse).to_string(),
            "illegal input: could not parse formula 'A &'"
        );
        let rejected = EngineError::rejected("formula set is satisfiable");
        assert_eq!(ServiceError::from(rejected).kind(), ErrorKind::IllegalInput);
    }

    #[test]
    fn test_decode_errors_are_classified() {
        let err = laas_protocol::decode_request::<laas_protocol::FormulaInput>(
            b"{}",
            Some("text/csv"),
        )
        .unwrap_err();
        assert_eq!(
            ServiceError::from(err),
            ServiceError::UnsupportedContentType("text/csv".into())
        );

        let err = laas_protocol::decode_request::<laas_protocol::FormulaInput>(
            br#"{"formulas": []}"#,
            None,
        )
        .unwrap_err();
        assert_eq!(
            ServiceError::from(err).to_string(),
            "illegal input: validation errors [field 'formulas': empty list]"
        );
    }
}
