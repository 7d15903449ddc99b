// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cross-check of declared data-group hashes against the signed content.
//!
//! The decoded `LDSSecurityObject` is authoritative. Every declared group must
//! be attested with an identical hash, and every attested group must be
//! declared. When raw data-group bytes are available, their digest under the
//! attested algorithm must also equal the attested hash.

use std::collections::{BTreeMap, BTreeSet};

use epassport_common::{DataGroupHash, DecodedContent, HashAlgorithm};
use serde::Serialize;
use tracing::trace;

use crate::validation_result::{ErrorCode, ValidationFailure, ValidationResult};

pub const DATA_GROUP_VALIDATOR_NAME: &str = "DataGroupHashes";

/// Why a group counts as tampered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TamperKind {
    /// Declared and attested hashes differ.
    ValueMismatch,
    /// Declared but absent from the signed content.
    MissingFromSignedContent,
    /// Attested but not declared.
    NotDeclared,
    /// Raw content does not hash to the attested value.
    ContentMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum DataGroupStatus {
    Match,
    Tampered {
        kind: TamperKind,
    },
    /// Digest lengths disagree with each other or with the attested algorithm.
    HashAlgorithmMismatch {
        declared_len: Option<usize>,
        attested_len: Option<usize>,
        expected_len: Option<usize>,
    },
    /// The cross-check did not run.
    NotChecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataGroupOutcome {
    pub number: u32,
    #[serde(flatten)]
    pub status: DataGroupStatus,
}

impl DataGroupOutcome {
    pub fn is_match(&self) -> bool {
        self.status == DataGroupStatus::Match
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGroupReport {
    /// Declared order first, then attested-only groups in attested order.
    pub outcomes: Vec<DataGroupOutcome>,
    pub result: ValidationResult,
}

impl DataGroupReport {
    pub fn outcome(&self, number: u32) -> Option<&DataGroupOutcome> {
        self.outcomes.iter().find(|o| o.number == number)
    }

    /// Every declared group as `NotChecked`, with a not-applicable result.
    pub fn not_checked(declared: &[DataGroupHash], reason: &str) -> Self {
        Self {
            outcomes: declared
                .iter()
                .map(|dg| DataGroupOutcome {
                    number: dg.number,
                    status: DataGroupStatus::NotChecked,
                })
                .collect(),
            result: ValidationResult::not_applicable(DATA_GROUP_VALIDATOR_NAME, Some(reason)),
        }
    }
}

/// Compare `declared` hashes with those attested in `content`.
///
/// `raw_content`, when given, maps group numbers to their raw bytes for
/// recomputation.
pub fn verify_data_groups(
    declared: &[DataGroupHash],
    content: &DecodedContent,
    raw_content: Option<&BTreeMap<u32, Vec<u8>>>,
) -> DataGroupReport {
    let algorithm = content.hash_algorithm.hash_algorithm();
    let expected_len = algorithm.map(HashAlgorithm::output_len);

    let mut outcomes: Vec<DataGroupOutcome> = declared
        .iter()
        .map(|dg| DataGroupOutcome {
            number: dg.number,
            status: declared_status(dg, content, algorithm, expected_len, raw_content),
        })
        .collect();

    let declared_numbers: BTreeSet<u32> = declared.iter().map(|dg| dg.number).collect();
    outcomes.extend(
        content
            .data_group_hashes
            .iter()
            .filter(|dg| !declared_numbers.contains(&dg.number))
            .map(|dg| DataGroupOutcome {
                number: dg.number,
                status: DataGroupStatus::Tampered {
                    kind: TamperKind::NotDeclared,
                },
            }),
    );

    let failures: Vec<ValidationFailure> = outcomes.iter().filter_map(failure_for).collect();
    trace!(groups = outcomes.len(), failures = failures.len(), "data group cross-check");

    let hash_algorithm = match algorithm {
        Some(alg) => alg.name().to_string(),
        None => content.hash_algorithm.oid.to_string(),
    };
    let result = ValidationResult::from_failures(DATA_GROUP_VALIDATOR_NAME, failures)
        .with_metadata("HashAlgorithm", hash_algorithm)
        .with_metadata("DataGroups", outcomes.len().to_string());

    DataGroupReport { outcomes, result }
}

fn declared_status(
    dg: &DataGroupHash,
    content: &DecodedContent,
    algorithm: Option<HashAlgorithm>,
    expected_len: Option<usize>,
    raw_content: Option<&BTreeMap<u32, Vec<u8>>>,
) -> DataGroupStatus {
    let Some(attested) = content.attested_hash(dg.number) else {
        return DataGroupStatus::Tampered {
            kind: TamperKind::MissingFromSignedContent,
        };
    };

    let declared_len = dg.hash.len();
    if declared_len != attested.len() || expected_len.is_some_and(|e| e != declared_len) {
        return DataGroupStatus::HashAlgorithmMismatch {
            declared_len: Some(declared_len),
            attested_len: Some(attested.len()),
            expected_len,
        };
    }

    if dg.hash != attested {
        return DataGroupStatus::Tampered {
            kind: TamperKind::ValueMismatch,
        };
    }

    if let Some(raw) = raw_content.and_then(|m| m.get(&dg.number)) {
        let Some(algorithm) = algorithm else {
            return DataGroupStatus::HashAlgorithmMismatch {
                declared_len: Some(declared_len),
                attested_len: Some(attested.len()),
                expected_len: None,
            };
        };
        if algorithm.digest(raw) != attested {
            return DataGroupStatus::Tampered {
                kind: TamperKind::ContentMismatch,
            };
        }
    }

    DataGroupStatus::Match
}

fn failure_for(outcome: &DataGroupOutcome) -> Option<ValidationFailure> {
    let n = outcome.number;
    let (code, message) = match &outcome.status {
        DataGroupStatus::Match | DataGroupStatus::NotChecked => return None,
        DataGroupStatus::Tampered { kind } => {
            let message = match kind {
                TamperKind::ValueMismatch => format!("DG{n} hash differs from the signed content"),
                TamperKind::MissingFromSignedContent => format!("DG{n} is not attested by the signed content"),
                TamperKind::NotDeclared => format!("DG{n} is attested by the signed content but was not declared"),
                TamperKind::ContentMismatch => format!("DG{n} content does not hash to the attested value"),
            };
            (ErrorCode::Tampered, message)
        }
        DataGroupStatus::HashAlgorithmMismatch {
            declared_len,
            attested_len,
            expected_len,
        } => {
            let message = match expected_len {
                Some(expected) => format!(
                    "DG{n} hash lengths disagree: declared {}, attested {}, algorithm {expected}",
                    fmt_len(*declared_len),
                    fmt_len(*attested_len)
                ),
                None if declared_len == attested_len => {
                    format!("DG{n} content cannot be rehashed: the attested hash algorithm is not supported")
                }
                None => format!(
                    "DG{n} hash lengths disagree: declared {}, attested {}",
                    fmt_len(*declared_len),
                    fmt_len(*attested_len)
                ),
            };
            (ErrorCode::HashAlgorithmMismatch, message)
        }
    };
    Some(ValidationFailure::new(code, message).with_property(format!("DG{n}")))
}

fn fmt_len(len: Option<usize>) -> String {
    len.map_or_else(|| "-".to_string(), |l| l.to_string())
}
