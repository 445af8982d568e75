// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cross-format tests for laas-protocol.

use std::collections::BTreeMap;

use laas_protocol::{
    Assignment, AssignmentInput, BackboneResult, ComputationState, DecodeError, FormulaItem,
    MaxSatInput, MaxSatResult, MediaType, SatResult, ServiceOutput, SubstitutionInput,
    WireMessage, decode_request, encode_response,
};

#[test]
fn test_assignment_input_json_matches_binary() {
    let json = br#"{
        "formulas": [{"formula": "~(A & B) => C | ~D"}],
        "assignment": {"mapping": [{"variable": "A", "value": true}, {"variable": "C", "value": false}]}
    }"#;
    let from_text: AssignmentInput = decode_request(json, Some("application/json")).unwrap();

    let expected = AssignmentInput {
        formulas: vec![FormulaItem::new("~(A & B) => C | ~D")],
        assignment: Some(Assignment::from_pairs([("A", true), ("C", false)])),
    };
    assert_eq!(from_text, expected);

    let binary = expected.encode_binary();
    let from_binary: AssignmentInput =
        decode_request(&binary, Some("application/protobuf")).unwrap();
    assert_eq!(from_binary, from_text);
}

#[test]
fn test_substitution_input_survives_both_formats() {
    let mut substitution = BTreeMap::new();
    substitution.insert("A".to_string(), "X & ~Y".to_string());
    substitution.insert("D".to_string(), "~P".to_string());
    let input = SubstitutionInput {
        formulas: vec![FormulaItem::described("~(A & B) => C <=> ~D", "rule 7")],
        substitution,
    };

    let text = input.encode_text().unwrap();
    assert_eq!(SubstitutionInput::decode_text(&text).unwrap(), input);
    assert_eq!(
        SubstitutionInput::decode_binary(&input.encode_binary()).unwrap(),
        input
    );
}

#[test]
fn test_maxsat_input_survives_both_formats() {
    let mut soft = BTreeMap::new();
    soft.insert("~A".to_string(), 2);
    soft.insert("~B".to_string(), 1);
    let input = MaxSatInput {
        hard_formulas: vec![FormulaItem::new("A | B")],
        soft_formulas: soft,
    };
    for media in [MediaType::Json, MediaType::Protobuf] {
        let bytes = input.encode_as(media).unwrap();
        assert_eq!(MaxSatInput::decode_as(media, &bytes).unwrap(), input);
    }
}

#[test]
fn test_result_binary_matches_json_content() {
    let result = SatResult::unsatisfiable(vec![
        FormulaItem::new("~E"),
        FormulaItem::described("A", "fact"),
    ]);
    let (json_media, json) = encode_response(&result, None).unwrap();
    let (bin_media, bin) = encode_response(&result, Some("application/protobuf")).unwrap();
    assert_eq!(json_media, MediaType::Json);
    assert_eq!(bin_media, MediaType::Protobuf);
    assert_eq!(
        SatResult::decode_text(&json).unwrap(),
        SatResult::decode_binary(&bin).unwrap()
    );
}

#[test]
fn test_maxsat_result_json_layout() {
    let result = MaxSatResult::new(
        true,
        2,
        vec!["~A".into(), "B".into(), "C".into(), "D".into(), "X".into()],
    );
    let (_, body) = encode_response(&result, None).unwrap();
    let expected = r#"{
  "state": {
    "success": true
  },
  "satisfiable": true,
  "optimum": 2,
  "model": [
    "~A",
    "B",
    "C",
    "D",
    "X"
  ]
}
"#;
    assert_eq!(std::str::from_utf8(&body).unwrap(), expected);
}

#[test]
fn test_backbone_result_state_can_be_replaced() {
    let mut result = BackboneResult::new(true, vec!["A".into()], vec![], vec!["B".into()]);
    result.set_state(ComputationState::failure("boom"));
    assert_eq!(result.state().map(|s| s.success), Some(false));
}

#[test]
fn test_validation_error_message_names_every_field() {
    let err =
        decode_request::<laas_protocol::FormulaVarsInput>(br#"{"formulas": []}"#, None)
            .unwrap_err();
    match err {
        DecodeError::Invalid(errors) => {
            assert_eq!(
                errors.to_string(),
                "validation errors [field 'formulas': empty list] [field 'variables': empty list]"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
