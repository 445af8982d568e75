// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural validation of decoded request objects.
//!
//! Validation never looks at formula semantics. It only checks that the
//! fields a computation needs are present, so that the backend is never
//! called with an incomplete request.

use std::collections::BTreeMap;
use std::fmt;

/// Field name to problem description. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// No problems recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem for `field`. The first problem per field wins.
    pub fn add(&mut self, field: impl Into<String>, problem: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_insert_with(|| problem.into());
    }

    /// True when no problem was recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Problem recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate over `(field, problem)` in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation errors")?;
        for (field, problem) in &self.fields {
            write!(f, " [field '{field}': {problem}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Structural completeness check run on every decoded request object.
pub trait Validate {
    /// Collect every field problem.
    fn validate(&self) -> ValidationErrors;
}
