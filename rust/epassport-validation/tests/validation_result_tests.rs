// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic unit tests for `ValidationResult` helpers.

use epassport_common::ContentFraming;
use epassport_test_utils::LdsSecurityObjectBuilder;
use epassport_validation::{
    validate_content, ErrorCode, ValidationFailure, ValidationResult, ValidationResultKind, CONTENT_VALIDATOR_NAME,
};

#[test]
fn validation_result_helpers_work() {
    let ok = ValidationResult::success("V", None);
    assert!(ok.is_valid());

    let bad = ValidationResult::failure_message("V", "oops", ErrorCode::Tampered);
    assert!(bad.is_failure());
    assert_eq!(bad.failures.len(), 1);
    assert!(bad.has_error_code(ErrorCode::Tampered));

    let na = ValidationResult::not_applicable("V", Some("prerequisite failed"));
    assert!(na.is_not_applicable());
    assert_eq!(
        na.metadata.get(ValidationResult::METADATA_REASON_KEY).map(String::as_str),
        Some("prerequisite failed")
    );
    assert!(ValidationResult::not_applicable("V", Some("  ")).metadata.is_empty());
}

#[test]
fn from_failures_picks_the_kind() {
    assert!(ValidationResult::from_failures("V", Vec::new()).is_valid());
    let res = ValidationResult::from_failures("V", vec![ValidationFailure::new(ErrorCode::MrzCheckDigit, "x")]);
    assert_eq!(res.kind, ValidationResultKind::Failure);
}

#[test]
fn error_codes_serialize_as_stable_strings() {
    assert_eq!(serde_json::to_string(&ErrorCode::KeyShapeMismatch).unwrap(), "\"KEY_SHAPE_MISMATCH\"");
    assert_eq!(ErrorCode::MalformedMrz.to_string(), "MALFORMED_MRZ");
    assert_eq!(ErrorCode::HashAlgorithmMismatch.as_str(), "HASH_ALGORITHM_MISMATCH");
}

#[test]
fn content_stage_maps_decode_errors_to_codes() {
    let bytes = LdsSecurityObjectBuilder::new(epassport_common::HashAlgorithm::Sha256)
        .group(1, vec![1; 32])
        .build();

    let ok = validate_content(&bytes, ContentFraming::LdsSecurityObject);
    assert!(ok.result.is_valid());
    assert_eq!(ok.result.validator_name, CONTENT_VALIDATOR_NAME);
    assert_eq!(ok.result.metadata.get("DataGroups").map(String::as_str), Some("1"));

    let truncated = validate_content(&bytes[..bytes.len() - 3], ContentFraming::LdsSecurityObject);
    assert!(truncated.content.is_none());
    assert!(truncated.result.has_error_code(ErrorCode::TruncatedContent));

    let wrong_tag = validate_content(&[0x04, 0x00], ContentFraming::LdsSecurityObject);
    assert!(wrong_tag.result.has_error_code(ErrorCode::UnexpectedTag));

    let mut trailing = bytes.clone();
    trailing.push(0);
    let trailing = validate_content(&trailing, ContentFraming::LdsSecurityObject);
    assert!(trailing.result.has_error_code(ErrorCode::MalformedContent));
}
