// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use epassport_common::{parse_mrz, MrzData, MrzFormat};
use tracing::debug;

use crate::validation_result::{ErrorCode, ValidationFailure, ValidationResult};

pub const MRZ_VALIDATOR_NAME: &str = "MRZ";

/// Parsed MRZ (when its structure is valid) and the stage result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrzReport {
    pub data: Option<MrzData>,
    pub result: ValidationResult,
}

/// Parse `mrz` and require every check digit to match.
pub fn validate_mrz(mrz: &str) -> MrzReport {
    let data = match parse_mrz(mrz) {
        Ok(d) => d,
        Err(e) => {
            debug!(error = %e, "MRZ is malformed");
            return MrzReport {
                data: None,
                result: ValidationResult::failure_message(MRZ_VALIDATOR_NAME, e.to_string(), ErrorCode::from(&e)),
            };
        }
    };

    let failures = data
        .check_digits
        .iter()
        .filter(|c| !c.valid)
        .map(|c| {
            ValidationFailure::new(
                ErrorCode::MrzCheckDigit,
                format!(
                    "{} check digit is {:?}, computed {}",
                    c.field.name(),
                    c.declared,
                    c.computed
                ),
            )
            .with_property(c.field.name())
        })
        .collect();

    let format = match data.format {
        MrzFormat::Td1 => "TD1",
        MrzFormat::Td2 => "TD2",
        MrzFormat::Td3 => "TD3",
    };
    let result = ValidationResult::from_failures(MRZ_VALIDATOR_NAME, failures).with_metadata("Format", format);

    MrzReport {
        data: Some(data),
        result,
    }
}
