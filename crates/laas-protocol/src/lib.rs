// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Laas Protocol - request and result schemas for the logic service
//!
//! Every object exchanged with the service is defined once and derives both
//! `prost::Message` (compact binary) and the serde traits (structured text).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      laas-protocol                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Negotiation: Content-Type / Accept  →  MediaType           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Codec: WireMessage (JSON via serde, binary via prost)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validation: Validate → ValidationErrors                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Objects
//!
//! | Request | Used by |
//! |---------|---------|
//! | [`FormulaInput`] | most computations |
//! | [`FormulaVarsInput`] | projected model counting |
//! | [`AssignmentInput`] | evaluation and restriction |
//! | [`SubstitutionInput`] | variable substitution |
//! | [`MaxSatInput`] | MaxSAT |
//!
//! Results all carry a [`ComputationState`] in protobuf field 1. A failure
//! is always written as a [`ComputationResult`], which any client can decode
//! with the result type it expected.
//!
//! # Usage
//!
//! ```
//! use laas_protocol::{BoolResult, FormulaInput, decode_request, encode_response};
//!
//! let input: FormulaInput =
//!     decode_request(br#"{"formulas": [{"formula": "A & B"}]}"#, None).unwrap();
//! assert_eq!(input.formulas[0].formula, "A & B");
//!
//! let (media, body) = encode_response(&BoolResult::new(true), Some("*/*")).unwrap();
//! assert_eq!(media.as_str(), "application/json");
//! assert!(body.ends_with(b"\n"));
//! ```

pub mod codec;
pub mod input;
pub mod media;
pub mod result;
pub mod validate;

pub use codec::{
    CodecError, DecodeError, EncodeError, ServiceInput, ServiceOutput, WireMessage,
    decode_request, encode_response,
};
pub use input::{
    Assignment, AssignmentEntry, AssignmentInput, FormulaInput, FormulaItem, FormulaVarsInput,
    MaxSatInput, SubstitutionInput,
};
pub use media::{APPLICATION_JSON, APPLICATION_PROTOBUF, MediaType};
pub use result::{
    BackboneResult, BoolResult, Component, ComponentResult, ComputationResult, ComputationState,
    FormulaResult, GraphEdge, GraphNode, GraphResult, IntResult, MaxSatResult, ProfileResult,
    SatResult, StringResult, StringSetResult,
};
pub use validate::{Validate, ValidationErrors};
