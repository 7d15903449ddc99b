// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod content_validator;
pub mod data_group_verifier;
pub mod mrz_validator;
pub mod public_key;
pub mod signature_algorithm;
pub mod signature_verifier;
pub mod validation_result;

pub use content_validator::{validate_content, ContentReport, CONTENT_VALIDATOR_NAME};
pub use data_group_verifier::{
    verify_data_groups, DataGroupOutcome, DataGroupReport, DataGroupStatus, TamperKind, DATA_GROUP_VALIDATOR_NAME,
};
pub use mrz_validator::{validate_mrz, MrzReport, MRZ_VALIDATOR_NAME};
pub use public_key::{NamedCurve, PublicKey};
pub use signature_algorithm::{AlgorithmError, SignatureAlgorithm, SignatureFamily, SignatureScheme};
pub use signature_verifier::{
    check_signature, check_signature_with, verify_signature, SignatureError, SignatureSettings, VerifiedSignature,
    DEFAULT_RSA_EXPONENT, SIGNATURE_VALIDATOR_NAME,
};
pub use validation_result::{ErrorCode, ValidationFailure, ValidationResult, ValidationResultKind};
