// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wire codec.
//!
//! Every request and result object is a single Rust type deriving both
//! `prost::Message` and the serde traits, so the two encodings cannot drift
//! apart. The [`WireMessage`] capability is implemented for all of them by a
//! blanket impl.
//!
//! JSON output is pretty printed with two-space indentation and a trailing
//! newline. Maps are ordered so the same object always yields the same bytes.

use bytes::Bytes;
use prost::Message;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::media::MediaType;
use crate::result::ComputationState;
use crate::validate::{Validate, ValidationErrors};

/// Low-level encode/decode failure of one of the two formats.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Structured-text body could not be (de)serialized.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Binary body could not be decoded.
    #[error("{0}")]
    Protobuf(#[from] prost::DecodeError),
}

/// Failure while turning a request body into a request object.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// `Content-Type` names neither supported format.
    #[error("unsupported content-type {0}")]
    UnsupportedContentType(String),

    /// The body is not a valid encoding of the expected object.
    #[error(transparent)]
    Malformed(#[from] CodecError),

    /// The body decoded but required fields are missing.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Failure while turning a result object into a response body.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// `Accept` names neither supported format.
    #[error("unsupported accept: {0}")]
    UnsupportedAccept(String),

    /// Serialization itself failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Encode/decode capability shared by every request and result object.
pub trait WireMessage: Message + Default + Serialize + DeserializeOwned + Sized {
    /// Protobuf bytes.
    fn encode_binary(&self) -> Bytes {
        Bytes::from(self.encode_to_vec())
    }

    /// Decode protobuf bytes.
    fn decode_binary(data: &[u8]) -> Result<Self, CodecError> {
        Ok(<Self as Message>::decode(data)?)
    }

    /// Pretty JSON with a trailing newline.
    fn encode_text(&self) -> Result<Bytes, CodecError> {
        let mut buf = serde_json::to_vec_pretty(self)?;
        buf.push(b'\n');
        Ok(Bytes::from(buf))
    }

    /// Decode JSON bytes.
    fn decode_text(data: &[u8]) -> Result<Self, CodecError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Encode in the given format.
    fn encode_as(&self, media: MediaType) -> Result<Bytes, CodecError> {
        match media {
            MediaType::Json => self.encode_text(),
            MediaType::Protobuf => Ok(self.encode_binary()),
        }
    }

    /// Decode from the given format.
    fn decode_as(media: MediaType, data: &[u8]) -> Result<Self, CodecError> {
        match media {
            MediaType::Json => Self::decode_text(data),
            MediaType::Protobuf => Self::decode_binary(data),
        }
    }
}

impl<T> WireMessage for T where T: Message + Default + Serialize + DeserializeOwned {}

/// A request object: decodable and structurally checkable.
pub trait ServiceInput: WireMessage + Validate {}

impl<T> ServiceInput for T where T: WireMessage + Validate {}

/// A result object: encodable and carrying a [`ComputationState`].
pub trait ServiceOutput: WireMessage {
    /// Replace the state of this envelope.
    fn set_state(&mut self, state: ComputationState);

    /// The state carried, if set.
    fn state(&self) -> Option<&ComputationState>;
}

/// Decode and validate a request body.
///
/// The content type selects the decoder. Validation runs after a
/// successful decode and folds every field problem into one error.
pub fn decode_request<T: ServiceInput>(
    body: &[u8],
    content_type: Option<&str>,
) -> Result<T, DecodeError> {
    let media = MediaType::from_content_type(content_type).ok_or_else(|| {
        DecodeError::UnsupportedContentType(content_type.unwrap_or_default().to_string())
    })?;
    let input = T::decode_as(media, body)?;
    input.validate().into_result()?;
    Ok(input)
}

/// Encode a result object in the format named by `accept`.
pub fn encode_response<T: WireMessage>(
    value: &T,
    accept: Option<&str>,
) -> Result<(MediaType, Bytes), EncodeError> {
    let media = MediaType::from_accept(accept)
        .ok_or_else(|| EncodeError::UnsupportedAccept(accept.unwrap_or_default().to_string()))?;
    let body = value.encode_as(media)?;
    Ok((media, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FormulaInput, FormulaItem};
    use crate::result::BoolResult;

    #[test]
    fn test_decode_rejects_unknown_content_type() {
        let err = decode_request::<FormulaInput>(b"{}", Some("text/plain")).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedContentType(ref ct) if ct == "text/plain"));
        assert_eq!(err.to_string(), "unsupported content-type text/plain");
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode_request::<FormulaInput>(b"{\"formulas\": [", None).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(CodecError::Json(_))));
    }

    #[test]
    fn test_decode_malformed_protobuf() {
        let err =
            decode_request::<FormulaInput>(&[0xff, 0xff, 0xff], Some("application/protobuf"))
                .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(CodecError::Protobuf(_))));
    }

    #[test]
    fn test_decode_runs_validation() {
        let err = decode_request::<FormulaInput>(b"{\"formulas\": []}", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation errors [field 'formulas': empty list]"
        );
    }

    #[test]
    fn test_decode_missing_field_is_a_validation_error() {
        let err = decode_request::<FormulaInput>(b"{}", None).unwrap_err();
        assert!(matches!(err, DecodeError::Invalid(_)));
    }

    #[test]
    fn test_json_and_protobuf_decode_to_same_object() {
        let input = FormulaInput {
            formulas: vec![FormulaItem::described("A & B", "first"), FormulaItem::new("~C")],
        };
        let from_text = decode_request::<FormulaInput>(
            br#"{"formulas": [{"formula": "A & B", "description": "first"}, {"formula": "~C"}]}"#,
            Some("application/json"),
        )
        .unwrap();
        let from_binary =
            decode_request::<FormulaInput>(&input.encode_binary(), Some("application/protobuf"))
                .unwrap();
        assert_eq!(from_text, input);
        assert_eq!(from_binary, input);
    }

    #[test]
    fn test_encode_json_is_pretty_with_newline() {
        let result = BoolResult::new(true);
        let (media, body) = encode_response(&result, Some("*/*")).unwrap();
        assert_eq!(media, MediaType::Json);
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "{\n  \"state\": {\n    \"success\": true\n  },\n  \"value\": true\n}\n"
        );
    }

    #[test]
    fn test_encode_does_not_escape_html() {
        let result = crate::result::StringResult::new("a <b> & c");
        let (_, body) = encode_response(&result, None).unwrap();
        assert!(std::str::from_utf8(&body).unwrap().contains("a <b> & c"));
    }

    #[test]
    fn test_encode_rejects_unknown_accept() {
        let err = encode_response(&BoolResult::new(false), Some("text/html")).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedAccept(ref a) if a == "text/html"));
    }

    #[test]
    fn test_encode_is_byte_stable() {
        let mut profile = crate::result::ProfileResult::default();
        for (name, count) in [("Z", 1), ("A", 3), ("M", 2)] {
            profile.profile.insert(name.to_string(), count);
        }
        let (_, first) = encode_response(&profile, None).unwrap();
        let (_, second) = encode_response(&profile, None).unwrap();
        assert_eq!(first, second);
        let text = std::str::from_utf8(&first).unwrap();
        assert!(text.find("\"A\"").unwrap() < text.find("\"M\"").unwrap());
        assert!(text.find("\"M\"").unwrap() < text.find("\"Z\"").unwrap());
    }
}
