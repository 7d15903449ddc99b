// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ePassport passive authentication.
//!
//! Build a [`DocumentRecord`] (or parse the `PassportData` JSON form) and call
//! [`verify_document`]. The returned [`VerificationResult`] carries a verdict,
//! one result per stage, per-data-group outcomes and every failure reason.
//!
//! ```no_run
//! use epassport::{verify_json, VerificationSettings};
//!
//! # fn run(json: &str) -> Result<(), epassport::RecordError> {
//! let result = verify_json(json, &VerificationSettings::default())?;
//! if !result.is_authentic() {
//!     eprintln!("rejected: {:?}", result.reason_codes());
//! }
//! # Ok(())
//! # }
//! ```

mod passport_verifier;
mod record;
mod settings;
mod verification_result;
mod wire;

pub use passport_verifier::{verify_batch, verify_document, verify_json};
pub use record::{DocumentRecord, DocumentRecordBuilder, RecordError};
pub use settings::{ContentSettings, VerificationSettings};
pub use verification_result::{Verdict, VerificationResult};
pub use wire::{PassportData, WirePublicKey};

pub use epassport_common::{ContentFraming, DataGroupHash, HashAlgorithm, MrzData, MrzFormat, Sex};
pub use epassport_validation::{
    DataGroupOutcome, DataGroupStatus, ErrorCode, PublicKey, SignatureSettings, TamperKind, ValidationFailure,
    ValidationResult, ValidationResultKind,
};
