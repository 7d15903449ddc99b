// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signed-content decoding stage.

use epassport_common::{decode_signed_content, ContentFraming, DecodedContent};
use tracing::debug;

use crate::validation_result::{ErrorCode, ValidationResult};

pub const CONTENT_VALIDATOR_NAME: &str = "SignedContent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReport {
    /// Present exactly when the stage succeeded.
    pub content: Option<DecodedContent>,
    pub result: ValidationResult,
}

/// Decode `e_content` as an LDS Security Object under `framing`.
pub fn validate_content(e_content: &[u8], framing: ContentFraming) -> ContentReport {
    match decode_signed_content(e_content, framing) {
        Ok(content) => {
            let hash_algorithm = match content.hash_algorithm.hash_algorithm() {
                Some(alg) => alg.name().to_string(),
                None => content.hash_algorithm.oid.to_string(),
            };
            let result = ValidationResult::success(CONTENT_VALIDATOR_NAME, None)
                .with_metadata("Version", content.version.to_string())
                .with_metadata("HashAlgorithm", hash_algorithm)
                .with_metadata("DataGroups", content.data_group_hashes.len().to_string());
            ContentReport {
                content: Some(content),
                result,
            }
        }
        Err(e) => {
            debug!(error = %e, "signed content did not decode");
            ContentReport {
                content: None,
                result: ValidationResult::failure_message(CONTENT_VALIDATOR_NAME, e.to_string(), ErrorCode::from(&e)),
            }
        }
    }
}
