// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use epassport_common::MrzData;
use epassport_validation::{DataGroupOutcome, ErrorCode, ValidationFailure, ValidationResult};
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Authentic,
    NotAuthentic,
}

/// Full outcome of verifying one document.
///
/// Serializes to JSON for audit logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub verdict: Verdict,
    pub mrz: ValidationResult,
    pub content: ValidationResult,
    pub signature: ValidationResult,
    pub data_groups: ValidationResult,
    /// One entry per data group, declared groups first.
    pub data_group_outcomes: Vec<DataGroupOutcome>,
    /// Present when the MRZ structure was valid.
    pub mrz_data: Option<MrzData>,
    /// Every failure from every stage, in stage order.
    pub reasons: Vec<ValidationFailure>,
}

impl VerificationResult {
    pub(crate) fn from_stages(
        mrz: ValidationResult,
        mrz_data: Option<MrzData>,
        content: ValidationResult,
        signature: ValidationResult,
        data_groups: ValidationResult,
        data_group_outcomes: Vec<DataGroupOutcome>,
    ) -> Self {
        let stages = [&mrz, &content, &signature, &data_groups];
        let verdict = if stages.iter().all(|s| s.is_valid()) {
            Verdict::Authentic
        } else {
            Verdict::NotAuthentic
        };
        let reasons = stages.iter().flat_map(|s| s.failures.iter().cloned()).collect();

        Self {
            verdict,
            mrz,
            content,
            signature,
            data_groups,
            data_group_outcomes,
            mrz_data,
            reasons,
        }
    }

    pub fn is_authentic(&self) -> bool {
        self.verdict == Verdict::Authentic
    }

    /// Stage results in pipeline order.
    pub fn stages(&self) -> [&ValidationResult; 4] {
        [&self.mrz, &self.content, &self.signature, &self.data_groups]
    }

    pub fn reason_codes(&self) -> Vec<ErrorCode> {
        self.reasons.iter().filter_map(|r| r.error_code).collect()
    }

    pub fn has_reason(&self, code: ErrorCode) -> bool {
        self.reasons.iter().any(|r| r.error_code == Some(code))
    }

    pub fn data_group(&self, number: u32) -> Option<&DataGroupOutcome> {
        self.data_group_outcomes.iter().find(|o| o.number == number)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
