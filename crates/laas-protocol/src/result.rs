// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Result objects.
//!
//! Each result carries its [`ComputationState`] as protobuf field 1, so a
//! failure envelope ([`ComputationResult`]) can be decoded as any of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::ServiceOutput;
use crate::input::FormulaItem;

/// Success flag plus the failure message.
///
/// `success` is false exactly when `error` is non-empty.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct ComputationState {
    #[prost(bool, tag = "1")]
    #[serde(default)]
    pub success: bool,
    #[prost(string, tag = "2")]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl ComputationState {
    /// A successful computation.
    pub fn success() -> Self {
        Self {
            success: true,
            error: String::new(),
        }
    }

    /// A failed computation.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

macro_rules! service_outputs {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ServiceOutput for $ty {
                fn set_state(&mut self, state: ComputationState) {
                    self.state = Some(state);
                }

                fn state(&self) -> Option<&ComputationState> {
                    self.state.as_ref()
                }
            }
        )*
    };
}

service_outputs!(
    ComputationResult,
    FormulaResult,
    BoolResult,
    IntResult,
    StringResult,
    StringSetResult,
    ProfileResult,
    GraphResult,
    ComponentResult,
    SatResult,
    MaxSatResult,
    BackboneResult,
);

/// Envelope without payload, written for every failure.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ComputationResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
}

impl ComputationResult {
    /// Failure envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            state: Some(ComputationState::failure(error)),
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct FormulaResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(message, repeated, tag = "2")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formulas: Vec<FormulaItem>,
}

impl FormulaResult {
    pub fn new(formulas: Vec<FormulaItem>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            formulas,
        }
    }

    /// One undescribed formula.
    pub fn single(formula: impl Into<String>) -> Self {
        Self::new(vec![FormulaItem::new(formula)])
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct BoolResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub value: bool,
}

impl BoolResult {
    pub fn new(value: bool) -> Self {
        Self {
            state: Some(ComputationState::success()),
            value,
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct IntResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(int64, tag = "2")]
    #[serde(default)]
    pub value: i64,
}

impl IntResult {
    pub fn new(value: i64) -> Self {
        Self {
            state: Some(ComputationState::success()),
            value,
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct StringResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub value: String,
}

impl StringResult {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            value: value.into(),
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct StringSetResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(string, repeated, tag = "2")]
    #[serde(default)]
    pub values: Vec<String>,
}

impl StringSetResult {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            values,
        }
    }
}

/// Occurrence count per variable or literal.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ProfileResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(btree_map = "string, int64", tag = "2")]
    #[serde(default)]
    pub profile: BTreeMap<String, i64>,
}

impl ProfileResult {
    pub fn new(profile: BTreeMap<String, i64>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            profile,
        }
    }
}

#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct GraphNode {
    #[prost(int32, tag = "1")]
    #[serde(default)]
    pub id: i32,
    #[prost(string, tag = "2")]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct GraphEdge {
    #[prost(int32, tag = "1")]
    #[serde(default, rename = "srcID")]
    pub src_id: i32,
    #[prost(int32, tag = "2")]
    #[serde(default, rename = "destID")]
    pub dest_id: i32,
    #[prost(string, tag = "3")]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GraphResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(message, repeated, tag = "2")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<GraphNode>,
    #[prost(message, repeated, tag = "3")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<GraphEdge>,
}

impl GraphResult {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            nodes,
            edges,
        }
    }
}

/// One connected component. Serialized in JSON as a bare list.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Component {
    #[prost(message, repeated, tag = "1")]
    pub formulas: Vec<FormulaItem>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ComponentResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(message, repeated, tag = "2")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

impl ComponentResult {
    pub fn new(components: Vec<Vec<FormulaItem>>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            components: components
                .into_iter()
                .map(|formulas| Component { formulas })
                .collect(),
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub satisfiable: bool,
    #[prost(string, repeated, tag = "3")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsat_core: Vec<FormulaItem>,
}

impl SatResult {
    /// Satisfiable with a model.
    pub fn satisfiable(model: Vec<String>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            satisfiable: true,
            model,
            unsat_core: Vec::new(),
        }
    }

    /// Unsatisfiable, optionally with a core.
    pub fn unsatisfiable(unsat_core: Vec<FormulaItem>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            satisfiable: false,
            model: Vec::new(),
            unsat_core,
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct MaxSatResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub satisfiable: bool,
    #[prost(int64, tag = "3")]
    #[serde(default)]
    pub optimum: i64,
    #[prost(string, repeated, tag = "4")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model: Vec<String>,
}

impl MaxSatResult {
    pub fn new(satisfiable: bool, optimum: i64, model: Vec<String>) -> Self {
        Self {
            state: Some(ComputationState::success()),
            satisfiable,
            optimum,
            model,
        }
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct BackboneResult {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComputationState>,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub satisfiable: bool,
    #[prost(string, repeated, tag = "3")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positive: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative: Vec<String>,
    #[prost(string, repeated, tag = "5")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
}

impl BackboneResult {
    pub fn new(
        satisfiable: bool,
        positive: Vec<String>,
        negative: Vec<String>,
        optional: Vec<String>,
    ) -> Self {
        Self {
            state: Some(ComputationState::success()),
            satisfiable,
            positive,
            negative,
            optional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireMessage;

    #[test]
    fn test_failure_envelope_decodes_as_any_result() {
        let failure = ComputationResult::failure("computation timeout reached");
        let bytes = failure.encode_binary();
        let sat = SatResult::decode_binary(&bytes).unwrap();
        assert_eq!(sat.state, failure.state);
        assert!(!sat.satisfiable);
        assert!(sat.model.is_empty());
    }

    #[test]
    fn test_failure_envelope_json() {
        let text = ComputationResult::failure("unknown path: /x").encode_text().unwrap();
        assert_eq!(
            std::str::from_utf8(&text).unwrap(),
            "{\n  \"state\": {\n    \"success\": false,\n    \"error\": \"unknown path: /x\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_components_serialize_as_nested_lists() {
        let result = ComponentResult::new(vec![
            vec![FormulaItem::new("A | B")],
            vec![FormulaItem::new("C"), FormulaItem::described("D", "d")],
        ]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["components"][0][0]["formula"], "A | B");
        assert_eq!(value["components"][1][1]["description"], "d");
        let back: ComponentResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_graph_edge_json_names() {
        let result = GraphResult::new(
            vec![GraphNode {
                id: 0,
                label: "A".to_string(),
            }],
            vec![GraphEdge {
                src_id: 0,
                dest_id: 1,
                label: String::new(),
            }],
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["edges"][0]["srcID"], 0);
        assert_eq!(value["edges"][0]["destID"], 1);
        assert!(value["edges"][0].get("label").is_none());
    }

    #[test]
    fn test_sat_result_omits_empty_model() {
        let value = serde_json::to_value(SatResult::unsatisfiable(Vec::new())).unwrap();
        assert_eq!(value["satisfiable"], false);
        assert!(value.get("model").is_none());
        assert!(value.get("unsatCore").is_none());
    }
}
