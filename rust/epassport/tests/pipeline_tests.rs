// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod common;

use epassport::{
    verify_document, verify_json, ContentFraming, DataGroupStatus, ErrorCode, PassportData, PublicKey, TamperKind,
    ValidationResultKind, Verdict, VerificationSettings,
};
use epassport_test_utils as tu;

fn verify(record: &epassport::DocumentRecord) -> epassport::VerificationResult {
    common::init_tracing();
    verify_document(record, &VerificationSettings::default())
}

#[test]
fn genuine_rsa_document_is_authentic() {
    let result = verify(&common::rsa_record());

    assert_eq!(result.verdict, Verdict::Authentic);
    assert!(result.reasons.is_empty(), "{:?}", result.reasons);
    for stage in result.stages() {
        assert_eq!(stage.kind, ValidationResultKind::Success, "{}", stage.validator_name);
    }
    assert_eq!(result.data_group_outcomes.len(), 2);
    assert!(result.data_group_outcomes.iter().all(|o| o.is_match()));

    let mrz = result.mrz_data.as_ref().expect("mrz data");
    assert_eq!(mrz.document_number, "L898902C3");
}

#[test]
fn genuine_ecdsa_document_is_authentic() {
    let result = verify(&common::ecdsa_record());
    assert!(result.is_authentic(), "{:?}", result.reasons);
    assert_eq!(result.signature.metadata.get("Digest").map(String::as_str), Some("SHA-256"));
}

#[test]
fn flipped_declared_hash_marks_only_that_group_tampered() {
    for flipped in common::DATA_GROUPS {
        let builder = common::data_groups().into_iter().fold(
            epassport::DocumentRecord::builder()
                .mrz(tu::mrz::SPECIMEN_TD3)
                .signature_algorithm("sha256WithRSAEncryption")
                .public_key(common::rsa_public_key()),
            |b, (n, _, mut hash)| {
                if n == flipped {
                    hash[0] ^= 0x01;
                }
                b.data_group_hash(n, hash)
            },
        );
        let e_content = common::lds_security_object().build();
        let record = builder
            .encrypted_digest(tu::sign_rsa_pkcs1_sha256(tu::rsa_key(), &e_content))
            .e_content(e_content)
            .build()
            .unwrap();

        let result = verify(&record);

        assert_eq!(result.verdict, Verdict::NotAuthentic);
        assert_eq!(result.reason_codes(), vec![ErrorCode::Tampered]);
        assert_eq!(result.reasons[0].property_name.as_deref(), Some(format!("DG{flipped}").as_str()));
        assert!(result.signature.is_valid());
        for outcome in &result.data_group_outcomes {
            if outcome.number == flipped {
                assert_eq!(
                    outcome.status,
                    DataGroupStatus::Tampered {
                        kind: TamperKind::ValueMismatch
                    }
                );
            } else {
                assert!(outcome.is_match());
            }
        }
    }
}

#[test]
fn truncated_signed_content_skips_dependent_stages() {
    let mut e_content = common::lds_security_object().build();
    e_content.truncate(e_content.len() - 5);
    let record = common::rsa_record_over(e_content);

    let result = verify(&record);

    assert_eq!(result.verdict, Verdict::NotAuthentic);
    assert_eq!(result.reason_codes(), vec![ErrorCode::TruncatedContent]);
    assert!(result.signature.is_not_applicable());
    assert!(result.data_groups.is_not_applicable());
    assert!(result
        .data_group_outcomes
        .iter()
        .all(|o| o.status == DataGroupStatus::NotChecked));
    assert!(result.mrz.is_valid());
}

#[test]
fn signature_bit_flip_is_the_only_reason() {
    let record = common::rsa_record();
    let mut signature = record.encrypted_digest().to_vec();
    let last = signature.len() - 1;
    signature[last] ^= 0x01;
    let record = common::rsa_builder().encrypted_digest(signature).build().unwrap();

    let result = verify(&record);

    assert_eq!(result.verdict, Verdict::NotAuthentic);
    assert_eq!(result.reason_codes(), vec![ErrorCode::SignatureInvalid]);
    assert!(result.data_group_outcomes.iter().all(|o| o.is_match()));
}

#[test]
fn rsa_key_with_ecdsa_algorithm_is_a_shape_mismatch() {
    let record = common::rsa_builder()
        .signature_algorithm("ecdsa-with-SHA256")
        .build()
        .unwrap();

    let result = verify(&record);

    assert_eq!(result.reason_codes(), vec![ErrorCode::KeyShapeMismatch]);
    assert!(result.data_groups.is_valid());
}

#[test]
fn ec_key_with_rsa_algorithm_is_a_shape_mismatch() {
    let record = common::rsa_builder()
        .public_key(PublicKey::ec("P-256", tu::p256_point(tu::p256_key())))
        .build()
        .unwrap();

    let result = verify(&record);
    assert_eq!(result.reason_codes(), vec![ErrorCode::KeyShapeMismatch]);
}

#[test]
fn unknown_algorithm_is_unsupported() {
    let record = common::rsa_builder().signature_algorithm("md2WithRSAEncryption").build().unwrap();
    let result = verify(&record);
    assert_eq!(result.reason_codes(), vec![ErrorCode::UnsupportedAlgorithm]);
}

#[test]
fn bad_mrz_check_digit_alone_rejects_the_document() {
    let mrz = tu::mrz::SPECIMEN_TD3.replace("L898902C36", "L898902C37");
    let record = common::rsa_builder().mrz(mrz).build().unwrap();

    let result = verify(&record);

    assert_eq!(result.verdict, Verdict::NotAuthentic);
    assert!(result.has_reason(ErrorCode::MrzCheckDigit));
    assert!(result.reason_codes().iter().all(|c| *c == ErrorCode::MrzCheckDigit));
    assert!(result.signature.is_valid());
    assert!(result.data_groups.is_valid());
}

#[test]
fn every_failing_stage_contributes_a_reason() {
    let record = common::rsa_builder()
        .mrz("P<UTO")
        .encrypted_digest(vec![0u8; 128])
        .build()
        .unwrap();

    let result = verify(&record);

    assert_eq!(
        result.reason_codes(),
        vec![ErrorCode::MalformedMrz, ErrorCode::SignatureInvalid]
    );
    assert!(result.mrz_data.is_none());
}

#[test]
fn attested_group_missing_from_declared_list_is_tampered() {
    let (_, dg3) = tu::data_group(3, epassport::HashAlgorithm::Sha256);
    let record = common::rsa_record_over(common::lds_security_object().group(3, dg3).build());

    let result = verify(&record);

    assert_eq!(result.reason_codes(), vec![ErrorCode::Tampered]);
    assert_eq!(
        result.data_group(3).map(|o| &o.status),
        Some(&DataGroupStatus::Tampered {
            kind: TamperKind::NotDeclared
        })
    );
}

#[test]
fn parallel_mrz_matches_sequential() {
    common::init_tracing();
    let parallel = VerificationSettings::default().with_parallel_mrz(true);
    let sequential = VerificationSettings::default();

    for record in [
        common::rsa_record(),
        common::rsa_builder().mrz("garbage").build().unwrap(),
        common::rsa_record_over(vec![0x30, 0x03, 0x02]),
    ] {
        assert_eq!(verify_document(&record, &parallel), verify_document(&record, &sequential));
    }
}

#[test]
fn encapsulated_content_needs_matching_framing() {
    let record = common::rsa_record_over(common::lds_security_object().build_encapsulated());

    let encapsulated = VerificationSettings::default().with_framing(ContentFraming::EncapsulatedContentInfo);
    assert!(verify_document(&record, &encapsulated).is_authentic());

    let bare = verify_document(&record, &VerificationSettings::default());
    assert_eq!(bare.verdict, Verdict::NotAuthentic);
    assert!(bare.signature.is_not_applicable());
}

#[test]
fn raw_group_content_is_rehashed() {
    let builder = common::data_groups()
        .into_iter()
        .fold(common::rsa_builder(), |b, (n, content, _)| b.data_group_content(n, content));
    assert!(verify(&builder.clone().build().unwrap()).is_authentic());

    let tampered = builder.data_group_content(7, b"unrelated".to_vec());
    let tampered = tampered.build().unwrap();
    // DG7 is neither declared nor attested, so its content is ignored.
    assert!(verify(&tampered).is_authentic());

    let record = common::rsa_builder()
        .data_group_content(2, b"altered portrait".to_vec())
        .build()
        .unwrap();
    let result = verify(&record);
    assert_eq!(
        result.data_group(2).map(|o| &o.status),
        Some(&DataGroupStatus::Tampered {
            kind: TamperKind::ContentMismatch
        })
    );
    assert!(result.data_group(1).is_some_and(|o| o.is_match()));

    let hashes_only = VerificationSettings::default().without_data_group_recomputation();
    assert!(verify_document(&record, &hashes_only).is_authentic());
}

#[test]
fn verification_is_deterministic() {
    let record = common::rsa_record();
    assert_eq!(verify(&record), verify(&record));
}

#[test]
fn result_serializes_for_audit() {
    let record = common::rsa_builder().encrypted_digest(vec![1u8; 128]).build().unwrap();
    let json = verify(&record).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["verdict"], "NotAuthentic");
    assert_eq!(value["signature"]["kind"], "Failure");
    assert_eq!(value["reasons"][0]["error_code"], "SIGNATURE_INVALID");
    assert_eq!(value["data_group_outcomes"][0]["status"], "Match");
}

#[test]
fn json_documents_verify_end_to_end() {
    common::init_tracing();
    let json = PassportData::from(&common::rsa_record()).to_json().unwrap();
    let result = verify_json(&json, &VerificationSettings::default()).unwrap();
    assert!(result.is_authentic(), "{:?}", result.reasons);

    assert!(verify_json("{", &VerificationSettings::default()).is_err());
}
