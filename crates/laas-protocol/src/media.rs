// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Media type negotiation for request bodies and responses.

use std::fmt;

/// Structured-text media type.
pub const APPLICATION_JSON: &str = "application/json";

/// Compact binary media type.
pub const APPLICATION_PROTOBUF: &str = "application/protobuf";

/// The two wire formats understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Protocol buffers.
    Protobuf,
}

impl MediaType {
    /// Header value written on responses.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Json => APPLICATION_JSON,
            MediaType::Protobuf => APPLICATION_PROTOBUF,
        }
    }

    /// Resolve a `Content-Type` header value.
    ///
    /// A missing or empty header means JSON. Returns `None` for anything
    /// else than the two supported types.
    pub fn from_content_type(header: Option<&str>) -> Option<Self> {
        match essence(header).as_deref() {
            None | Some("") | Some(APPLICATION_JSON) => Some(MediaType::Json),
            Some(APPLICATION_PROTOBUF) => Some(MediaType::Protobuf),
            Some(_) => None,
        }
    }

    /// Resolve an `Accept` header value. The wildcard `*/*` selects JSON.
    pub fn from_accept(header: Option<&str>) -> Option<Self> {
        match essence(header).as_deref() {
            None | Some("") | Some("*/*") | Some(APPLICATION_JSON) => Some(MediaType::Json),
            Some(APPLICATION_PROTOBUF) => Some(MediaType::Protobuf),
            Some(_) => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media type without parameters, lowercased.
fn essence(header: Option<&str>) -> Option<String> {
    header.map(|value| {
        value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    })
}
