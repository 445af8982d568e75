// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LaaS Engine - Propositional Logic Computations
//!
//! This crate holds every logic algorithm the LaaS service exposes. It is
//! synchronous and transport-agnostic: callers hand in parsed [`Formula`]s
//! and a [`Deadline`], and get back formulas, models or numbers.
//!
//! # Architecture
//!
//! ```text
//!      formula text
//!           │
//!           ▼
//! ┌───────────────────┐     ┌───────────────────────────────────────────┐
//! │      parser       │────►│ Formula (smart constructors, Display)     │
//! └───────────────────┘     └───────────────────────────────────────────┘
//!                                  │                 │
//!           ┌──────────────────────┤                 ├──────────────────┐
//!           ▼                      ▼                 ▼                  ▼
//! ┌──────────────────┐  ┌────────────────────┐ ┌───────────┐  ┌──────────────────┐
//! │ normalform       │  │ sat / explanation  │ │ dnnf /    │  │ functions, graph │
//! │ NNF CNF DNF AIG  │  │ maxsat / backbone  │ │ counting  │  │ substitution     │
//! │ (Clausifier)     │─►│ (DPLL Solver)      │ │           │  │ simplification   │
//! └──────────────────┘  └────────────────────┘ └───────────┘  └──────────────────┘
//!           ▲
//! ┌──────────────────┐
//! │ encoding, pseudo │  cardinality and pseudo-Boolean constraints to clauses
//! └──────────────────┘
//! ```
//!
//! # Auxiliary variables
//!
//! Encodings introduce fresh variables. Their names use reserved prefixes
//! that the parser never produces for user input:
//!
//! | Prefix | Introduced by |
//! |--------|---------------|
//! | `@RESERVED_CNF_` | Tseitin and Plaisted-Greenbaum transformations |
//! | `@RESERVED_CC_` | Cardinality constraint encodings |
//! | `@RESERVED_PBC_` | Pseudo-Boolean constraint encodings |
//! | `@RESERVED_SEL_` | Solver selectors for cores and MaxSAT relaxation |
//! | `@RESERVED_HS_` | Hitting sets of the smallest MUS search |
//! | `@RESERVED_RAIL_` | Dual-rail literals of minimum prime implicants |
//!
//! # Cancellation
//!
//! Long-running operations take a [`Deadline`] and poll it in their inner
//! loops. Once its token is cancelled or the timeout passes they return
//! [`EngineError::Aborted`].

pub mod assignment;
pub mod bdd;
pub mod clause;
pub mod counting;
pub mod deadline;
pub mod dnnf;
pub mod encoding;
pub mod error;
pub mod explanation;
pub mod formula;
pub mod functions;
pub mod graph;
pub mod maxsat;
pub mod normalform;
pub mod parser;
pub mod prime;
pub mod pseudo;
pub mod randomizer;
pub mod sat;
pub mod simplification;
pub mod substitution;

pub use assignment::{Assignment, evaluate, restrict};
pub use deadline::Deadline;
pub use error::{EngineError, Result};
pub use formula::{Comparator, Formula, Literal, Pbc};
pub use parser::{parse, parse_all};
pub use randomizer::Randomizer;
pub use sat::Solver;
