// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Algorithm selection by query parameter.
//!
//! Each computation family that offers several strategies declares them in
//! a [`VariantTable`]. A table names its default variant, and every table is
//! checked once at startup by [`validate_all`]. Adding a strategy is a new
//! table row; handlers only call [`VariantTable::resolve`].
//!
//! | Table | Parameter | Default |
//! |-------|-----------|---------|
//! | [`CC`] | `algorithm` | `pure` |
//! | [`PBC`] | `algorithm` | `swc` |
//! | [`MUS`] | `algorithm` | `deletion` |
//! | [`CNF`] | `algorithm` | `advanced` |
//! | [`DNF`] | `algorithm` | `factorization` |
//! | [`COUNT`] | `algorithm` | `dnnf` |
//! | [`PROJECTED_COUNT`] | `algorithm` | `sat` |
//! | [`MAXSAT`] | `algorithm` | `linear-su` |
//! | [`PRIME_COVER`] | `algorithm` | `max` |
//! | [`GRAPH_FORMAT`] | `format` | `mermaid` |
//! | [`FORMULA_GRAPH_TYPE`] | `type` | `dag` |

use std::collections::HashSet;

use laas_engine::counting::CountAlgorithm;
use laas_engine::encoding::{CcAlgorithm, PbcAlgorithm};
use laas_engine::explanation::MusAlgorithm;
use laas_engine::graph::{FormulaGraphType, GraphFormat};
use laas_engine::maxsat::MaxSatAlgorithm;
use laas_engine::normalform::{CnfAlgorithm, DnfAlgorithm};
use laas_engine::prime::CoverAlgorithm;
use thiserror::Error;

use crate::error::{Result, ServiceError};

/// One named strategy.
#[derive(Debug, Clone, Copy)]
pub struct Variant<V: 'static> {
    pub name: &'static str,
    pub value: V,
    pub default: bool,
}

impl<V> Variant<V> {
    pub const fn new(name: &'static str, value: V) -> Self {
        Self {
            name,
            value,
            default: false,
        }
    }

    pub const fn default(name: &'static str, value: V) -> Self {
        Self {
            name,
            value,
            default: true,
        }
    }
}

/// The strategies of one computation family.
#[derive(Debug)]
pub struct VariantTable<V: 'static> {
    /// Used in error messages, e.g. `cc algorithm`.
    label: &'static str,
    /// Query parameter selecting the variant.
    parameter: &'static str,
    variants: &'static [Variant<V>],
}

impl<V: Copy> VariantTable<V> {
    pub const fn new(
        label: &'static str,
        parameter: &'static str,
        variants: &'static [Variant<V>],
    ) -> Self {
        Self {
            label,
            parameter,
            variants,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// Variant names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.variants.iter().map(|v| v.name)
    }

    /// Resolve a query value. Absent selects the default; an unknown name is
    /// illegal input.
    pub fn resolve(&self, requested: Option<&str>) -> Result<V> {
        let found = match requested {
            None => self.variants.iter().find(|v| v.default),
            Some(name) => self.variants.iter().find(|v| v.name == name),
        };
        match (found, requested) {
            (Some(variant), _) => Ok(variant.value),
            (None, Some(name)) => Err(ServiceError::illegal_input(format!(
                "unknown {} '{}'",
                self.label, name
            ))),
            (None, None) => Err(ServiceError::internal(format!(
                "no default {} declared",
                self.label
            ))),
        }
    }
}

/// Startup check of a table.
pub trait CheckedTable: Sync {
    fn check(&self) -> std::result::Result<(), DispatchError>;
}

impl<V: Copy + Sync> CheckedTable for VariantTable<V> {
    fn check(&self) -> std::result::Result<(), DispatchError> {
        if self.variants.is_empty() {
            return Err(DispatchError::Empty { table: self.label });
        }
        let defaults = self.variants.iter().filter(|v| v.default).count();
        if defaults != 1 {
            return Err(DispatchError::Defaults {
                table: self.label,
                count: defaults,
            });
        }
        let mut seen = HashSet::new();
        for variant in self.variants {
            if !seen.insert(variant.name) {
                return Err(DispatchError::Duplicate {
                    table: self.label,
                    name: variant.name,
                });
            }
        }
        Ok(())
    }
}

/// A malformed dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The table declares no variants.
    #[error("{table} table is empty")]
    Empty { table: &'static str },

    /// The table does not have exactly one default.
    #[error("{table} table declares {count} defaults, expected exactly one")]
    Defaults { table: &'static str, count: usize },

    /// Two variants share a name.
    #[error("{table} table declares '{name}' twice")]
    Duplicate {
        table: &'static str,
        name: &'static str,
    },
}

pub static CC: VariantTable<CcAlgorithm> = VariantTable::new(
    "cc algorithm",
    "algorithm",
    &[
        Variant::default("pure", CcAlgorithm::Pure),
        Variant::new("ladder", CcAlgorithm::Ladder),
        Variant::new("binary", CcAlgorithm::Binary),
        Variant::new("totalizer", CcAlgorithm::Totalizer),
    ],
);

pub static PBC: VariantTable<PbcAlgorithm> = VariantTable::new(
    "pbc algorithm",
    "algorithm",
    &[Variant::default("swc", PbcAlgorithm::Swc)],
);

pub static MUS: VariantTable<MusAlgorithm> = VariantTable::new(
    "mus algorithm",
    "algorithm",
    &[
        Variant::default("deletion", MusAlgorithm::Deletion),
        Variant::new("insertion", MusAlgorithm::Insertion),
    ],
);

pub static CNF: VariantTable<CnfAlgorithm> = VariantTable::new(
    "cnf algorithm",
    "algorithm",
    &[
        Variant::default("advanced", CnfAlgorithm::Advanced),
        Variant::new("factorization", CnfAlgorithm::Factorization),
        Variant::new("tseitin", CnfAlgorithm::Tseitin),
        Variant::new("pg", CnfAlgorithm::Pg),
        Variant::new("canonical", CnfAlgorithm::Canonical),
        Variant::new("bdd", CnfAlgorithm::Bdd),
    ],
);

pub static DNF: VariantTable<DnfAlgorithm> = VariantTable::new(
    "dnf algorithm",
    "algorithm",
    &[
        Variant::default("factorization", DnfAlgorithm::Factorization),
        Variant::new("canonical", DnfAlgorithm::Canonical),
        Variant::new("bdd", DnfAlgorithm::Bdd),
    ],
);

pub static COUNT: VariantTable<CountAlgorithm> = VariantTable::new(
    "counting algorithm",
    "algorithm",
    &[
        Variant::default("dnnf", CountAlgorithm::Dnnf),
        Variant::new("sat", CountAlgorithm::Sat),
        Variant::new("bdd", CountAlgorithm::Bdd),
    ],
);

/// Projected counting has no d-DNNF variant.
pub static PROJECTED_COUNT: VariantTable<CountAlgorithm> = VariantTable::new(
    "projected counting algorithm",
    "algorithm",
    &[
        Variant::default("sat", CountAlgorithm::Sat),
        Variant::new("bdd", CountAlgorithm::Bdd),
    ],
);

pub static MAXSAT: VariantTable<MaxSatAlgorithm> = VariantTable::new(
    "maxsat algorithm",
    "algorithm",
    &[
        Variant::default("linear-su", MaxSatAlgorithm::LinearSu),
        Variant::new("linear-us", MaxSatAlgorithm::LinearUs),
    ],
);

pub static PRIME_COVER: VariantTable<CoverAlgorithm> = VariantTable::new(
    "prime implicant cover algorithm",
    "algorithm",
    &[
        Variant::default("max", CoverAlgorithm::Max),
        Variant::new("min", CoverAlgorithm::Min),
    ],
);

pub static GRAPH_FORMAT: VariantTable<GraphFormat> = VariantTable::new(
    "output format",
    "format",
    &[
        Variant::default("mermaid", GraphFormat::Mermaid),
        Variant::new("graphviz", GraphFormat::Graphviz),
    ],
);

pub static FORMULA_GRAPH_TYPE: VariantTable<FormulaGraphType> = VariantTable::new(
    "graph type",
    "type",
    &[
        Variant::default("dag", FormulaGraphType::Dag),
        Variant::new("ast", FormulaGraphType::Ast),
    ],
);

fn tables() -> [&'static dyn CheckedTable; 11] {
    [
        &CC,
        &PBC,
        &MUS,
        &CNF,
        &DNF,
        &COUNT,
        &PROJECTED_COUNT,
        &MAXSAT,
        &PRIME_COVER,
        &GRAPH_FORMAT,
        &FORMULA_GRAPH_TYPE,
    ]
}

/// Check every table. Called before the listener is bound.
pub fn validate_all() -> std::result::Result<(), DispatchError> {
    tables().iter().try_for_each(|table| table.check())
}

/// Boolean query flag: `true`, `false` or absent (false).
pub fn flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ServiceError::illegal_input(format!(
            "illegal {name} value '{other}'"
        ))),
    }
}

/// Numeric query parameter with a default.
pub fn number<T: std::str::FromStr>(name: &str, raw: Option<&str>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            ServiceError::illegal_input(format!("illegal {name} value '{value}'"))
        }),
    }
}
