// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request objects.
//!
//! Fields default when absent so that a missing field surfaces as a
//! validation problem rather than a decode error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validate::{Validate, ValidationErrors};

const EMPTY_LIST: &str = "empty list";
const EMPTY_FIELD: &str = "required field is empty";
const EMPTY_FORMULA: &str = "contains empty formula";
const EMPTY_VARIABLE: &str = "contains empty variable";

/// A formula in textual syntax with an optional caller-supplied description.
#[derive(Clone, PartialEq, Eq, Hash, prost::Message, Serialize, Deserialize)]
pub struct FormulaItem {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub formula: String,
    #[prost(string, tag = "2")]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FormulaItem {
    /// Formula without description.
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            description: String::new(),
        }
    }

    /// Formula with description.
    pub fn described(formula: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            description: description.into(),
        }
    }

    /// Same description, different formula text.
    pub fn with_formula(&self, formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            description: self.description.clone(),
        }
    }
}

/// A list of formulas.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct FormulaInput {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub formulas: Vec<FormulaItem>,
}

impl Validate for FormulaInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_formulas(&self.formulas, "formulas", &mut errors);
        errors
    }
}

/// Formulas plus a variable selection (projection).
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct FormulaVarsInput {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub formulas: Vec<FormulaItem>,
    #[prost(string, repeated, tag = "2")]
    #[serde(default)]
    pub variables: Vec<String>,
}

impl Validate for FormulaVarsInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_formulas(&self.formulas, "formulas", &mut errors);
        if self.variables.is_empty() {
            errors.add("variables", EMPTY_LIST);
        } else if self.variables.iter().any(|v| v.trim().is_empty()) {
            errors.add("variables", EMPTY_VARIABLE);
        }
        errors
    }
}

/// One variable assigned to a truth value.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct AssignmentEntry {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub variable: String,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub value: bool,
}

/// A partial assignment.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct Assignment {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub mapping: Vec<AssignmentEntry>,
}

impl Assignment {
    /// Build from `(variable, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        Self {
            mapping: pairs
                .into_iter()
                .map(|(variable, value)| AssignmentEntry {
                    variable: variable.to_string(),
                    value,
                })
                .collect(),
        }
    }
}

/// Formulas plus an assignment.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct AssignmentInput {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub formulas: Vec<FormulaItem>,
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

impl Validate for AssignmentInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_formulas(&self.formulas, "formulas", &mut errors);
        match &self.assignment {
            None => errors.add("assignment", EMPTY_FIELD),
            Some(assignment) => {
                if assignment
                    .mapping
                    .iter()
                    .any(|entry| entry.variable.trim().is_empty())
                {
                    errors.add("assignment", EMPTY_VARIABLE);
                }
            }
        }
        errors
    }
}

/// Formulas plus a variable-to-formula substitution. An empty substitution
/// leaves the formulas unchanged.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct SubstitutionInput {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub formulas: Vec<FormulaItem>,
    #[prost(btree_map = "string, string", tag = "2")]
    #[serde(default)]
    pub substitution: BTreeMap<String, String>,
}

impl Validate for SubstitutionInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_formulas(&self.formulas, "formulas", &mut errors);
        for (replace, with) in &self.substitution {
            if replace.trim().is_empty() {
                errors.add("substitution", EMPTY_VARIABLE);
            } else if with.trim().is_empty() {
                errors.add("substitution", EMPTY_FORMULA);
            }
        }
        errors
    }
}

/// Hard formulas plus weighted soft formulas.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSatInput {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub hard_formulas: Vec<FormulaItem>,
    #[prost(btree_map = "string, int64", tag = "2")]
    #[serde(default)]
    pub soft_formulas: BTreeMap<String, i64>,
}

impl Validate for MaxSatInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self
            .hard_formulas
            .iter()
            .any(|item| item.formula.trim().is_empty())
        {
            errors.add("hardFormulas", EMPTY_FORMULA);
        }
        if self.soft_formulas.is_empty() {
            errors.add("softFormulas", EMPTY_FIELD);
        }
        for (formula, weight) in &self.soft_formulas {
            if formula.trim().is_empty() {
                errors.add("softFormulas", EMPTY_FORMULA);
            } else if *weight < 0 {
                errors.add("softFormulas", "contains weight < 0");
            }
        }
        errors
    }
}

fn require_formulas(formulas: &[FormulaItem], field: &str, errors: &mut ValidationErrors) {
    if formulas.is_empty() {
        errors.add(field, EMPTY_LIST);
    } else if formulas.iter().any(|item| item.formula.trim().is_empty()) {
        errors.add(field, EMPTY_FORMULA);
    }
}
