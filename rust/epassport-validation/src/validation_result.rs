// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation result types.
//!
//! Every validator in this crate reports through a [`ValidationResult`] rather
//! than an error: a document that fails a check is a finding, not a fault.
//! Each failure carries a stable [`ErrorCode`] so callers can react to the
//! reason without parsing messages.

use std::collections::BTreeMap;
use std::fmt;

use epassport_common::{DecodeError, MrzError};
use serde::Serialize;

/// Outcome classification for a single validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ValidationResultKind {
    /// Stage ran and succeeded.
    Success,
    /// Stage ran and failed.
    Failure,
    /// Stage did not run because a prerequisite stage failed.
    #[default]
    NotApplicable,
}

/// Stable, machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MalformedMrz,
    MrzCheckDigit,
    TruncatedContent,
    UnexpectedTag,
    LengthOverflow,
    MalformedContent,
    HashAlgorithmMismatch,
    Tampered,
    UnsupportedAlgorithm,
    KeyShapeMismatch,
    InvalidPublicKey,
    SignatureInvalid,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedMrz => "MALFORMED_MRZ",
            ErrorCode::MrzCheckDigit => "MRZ_CHECK_DIGIT",
            ErrorCode::TruncatedContent => "TRUNCATED_CONTENT",
            ErrorCode::UnexpectedTag => "UNEXPECTED_TAG",
            ErrorCode::LengthOverflow => "LENGTH_OVERFLOW",
            ErrorCode::MalformedContent => "MALFORMED_CONTENT",
            ErrorCode::HashAlgorithmMismatch => "HASH_ALGORITHM_MISMATCH",
            ErrorCode::Tampered => "TAMPERED",
            ErrorCode::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            ErrorCode::KeyShapeMismatch => "KEY_SHAPE_MISMATCH",
            ErrorCode::InvalidPublicKey => "INVALID_PUBLIC_KEY",
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DecodeError> for ErrorCode {
    fn from(e: &DecodeError) -> Self {
        match e {
            DecodeError::TruncatedContent { .. } => ErrorCode::TruncatedContent,
            DecodeError::UnexpectedTag { .. } => ErrorCode::UnexpectedTag,
            DecodeError::LengthOverflow { .. } => ErrorCode::LengthOverflow,
            DecodeError::TrailingBytes { .. }
            | DecodeError::InvalidValue { .. }
            | DecodeError::UnexpectedContentType { .. } => ErrorCode::MalformedContent,
        }
    }
}

impl From<&MrzError> for ErrorCode {
    fn from(_: &MrzError) -> Self {
        ErrorCode::MalformedMrz
    }
}

/// A single validation failure, optionally annotated with an error code and details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationFailure {
    /// Human-readable failure message.
    pub message: String,
    pub error_code: Option<ErrorCode>,
    /// Field or data group the failure is about, e.g. `composite` or `DG2`.
    pub property_name: Option<String>,
}

impl ValidationFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: Some(code),
            property_name: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }
}

/// Result for a single validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    pub kind: ValidationResultKind,
    /// Friendly stage name (e.g. "Signature").
    pub validator_name: String,
    /// Failures when `kind == Failure`.
    pub failures: Vec<ValidationFailure>,
    /// Diagnostic metadata, such as the resolved algorithm.
    pub metadata: BTreeMap<String, String>,
}

impl ValidationResult {
    pub const METADATA_REASON_KEY: &'static str = "Reason";

    pub fn is_valid(&self) -> bool {
        matches!(self.kind, ValidationResultKind::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.kind, ValidationResultKind::Failure)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.kind, ValidationResultKind::NotApplicable)
    }

    /// Create a successful stage result.
    pub fn success(validator_name: impl Into<String>, metadata: Option<BTreeMap<String, String>>) -> Self {
        Self {
            kind: ValidationResultKind::Success,
            validator_name: validator_name.into(),
            failures: Vec::new(),
            metadata: metadata.unwrap_or_default(),
        }
    }

    /// Create a not-applicable stage result.
    ///
    /// A non-empty `reason` is stored under [`Self::METADATA_REASON_KEY`].
    pub fn not_applicable(validator_name: impl Into<String>, reason: Option<&str>) -> Self {
        let mut metadata = BTreeMap::new();
        if let Some(r) = reason.filter(|r| !r.trim().is_empty()) {
            metadata.insert(Self::METADATA_REASON_KEY.to_string(), r.to_string());
        }
        Self {
            kind: ValidationResultKind::NotApplicable,
            validator_name: validator_name.into(),
            failures: Vec::new(),
            metadata,
        }
    }

    pub fn failure(validator_name: impl Into<String>, failures: Vec<ValidationFailure>) -> Self {
        Self {
            kind: ValidationResultKind::Failure,
            validator_name: validator_name.into(),
            failures,
            metadata: BTreeMap::new(),
        }
    }

    /// Convenience helper for a single failure message.
    pub fn failure_message(validator_name: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self::failure(validator_name, vec![ValidationFailure::new(code, message)])
    }

    /// Success when `failures` is empty, else failure.
    pub fn from_failures(validator_name: impl Into<String>, failures: Vec<ValidationFailure>) -> Self {
        if failures.is_empty() {
            Self::success(validator_name, None)
        } else {
            Self::failure(validator_name, failures)
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn error_codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.failures.iter().filter_map(|f| f.error_code)
    }

    pub fn has_error_code(&self, code: ErrorCode) -> bool {
        self.error_codes().any(|c| c == code)
    }
}
