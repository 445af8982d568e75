// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for laas-engine.

use thiserror::Error;

use crate::parser::ParseError;

/// Result type using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Formula text could not be parsed.
    #[error("could not parse formula '{input}'")]
    Parse {
        /// The offending input.
        input: String,
        /// Parser diagnostics.
        #[source]
        source: ParseError,
    },

    /// The input is well-formed but not acceptable for the computation.
    #[error("{0}")]
    Rejected(String),

    /// The deadline fired before the computation finished.
    #[error("computation aborted")]
    Aborted,
}

impl EngineError {
    /// Shorthand for [`EngineError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        EngineError::Rejected(message.into())
    }

    /// True for [`EngineError::Aborted`].
    pub fn is_aborted(&self) -> bool {
        matches!(self, EngineError::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_names_input() {
        let err = crate::parser::parse("A &").unwrap_err();
        assert_eq!(err.to_string(), "could not parse formula 'A &'");
    }

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = EngineError::rejected("input 'A' is not a cardinality constraint");
        assert_eq!(err.to_string(), "input 'A' is not a cardinality constraint");
        assert!(!err.is_aborted());
        assert!(EngineError::Aborted.is_aborted());
    }
}
