// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Passive-authentication pipeline.
//!
//! Two independent branches run for every record:
//! - MRZ: structure and check digits
//! - signed content: decode `eContent`, verify the signature over it, then
//!   cross-check the declared data-group hashes against the decoded list
//!
//! When `eContent` does not decode, the signature and data-group stages are
//! reported as not applicable. Otherwise every stage runs, so one result
//! lists every reason the document is not authentic.

use std::panic;
use std::thread;

use epassport_validation::{
    validate_content, validate_mrz, verify_data_groups, verify_signature, DataGroupReport, MrzReport,
    ValidationResult, SIGNATURE_VALIDATOR_NAME,
};
use tracing::{debug, warn};

use crate::record::{DocumentRecord, RecordError};
use crate::settings::VerificationSettings;
use crate::verification_result::VerificationResult;

const CONTENT_NOT_DECODED: &str = "signed content did not decode";

struct SignedContentOutcome {
    content: ValidationResult,
    signature: ValidationResult,
    data_groups: DataGroupReport,
}

/// Verify one record.
pub fn verify_document(record: &DocumentRecord, settings: &VerificationSettings) -> VerificationResult {
    let (mrz, signed) = if settings.parallel_mrz() {
        thread::scope(|s| {
            let mrz = s.spawn(|| validate_mrz(record.mrz()));
            let signed = verify_signed_content(record, settings);
            let mrz = mrz.join().unwrap_or_else(|p| panic::resume_unwind(p));
            (mrz, signed)
        })
    } else {
        (validate_mrz(record.mrz()), verify_signed_content(record, settings))
    };

    let MrzReport { data, result } = mrz;
    let result = VerificationResult::from_stages(
        result,
        data,
        signed.content,
        signed.signature,
        signed.data_groups.result,
        signed.data_groups.outcomes,
    );

    for stage in result.stages().into_iter().filter(|s| s.is_failure()) {
        warn!(
            stage = %stage.validator_name,
            codes = ?stage.error_codes().collect::<Vec<_>>(),
            "verification stage failed"
        );
    }
    debug!(verdict = ?result.verdict, reasons = result.reasons.len(), "document verified");
    result
}

/// Parse a `PassportData` JSON document and verify it.
pub fn verify_json(json: &str, settings: &VerificationSettings) -> Result<VerificationResult, RecordError> {
    let record = DocumentRecord::from_json(json)?;
    Ok(verify_document(&record, settings))
}

/// Verify many records across worker threads.
///
/// Results are in input order. Within a batch the MRZ branch stays on the
/// record's worker.
pub fn verify_batch(records: &[DocumentRecord], settings: &VerificationSettings) -> Vec<VerificationResult> {
    let per_record = settings.clone().with_parallel_mrz(false);
    let workers = settings.batch_workers().min(records.len());
    debug!(records = records.len(), workers, "verifying batch");

    if workers <= 1 {
        return records.iter().map(|r| verify_document(r, &per_record)).collect();
    }

    let chunk_len = records.len().div_ceil(workers);
    let per_record = &per_record;
    thread::scope(|s| {
        let handles: Vec<_> = records
            .chunks(chunk_len)
            .map(|chunk| {
                s.spawn(move || {
                    chunk
                        .iter()
                        .map(|r| verify_document(r, per_record))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|p| panic::resume_unwind(p)))
            .collect()
    })
}

fn verify_signed_content(record: &DocumentRecord, settings: &VerificationSettings) -> SignedContentOutcome {
    let content = validate_content(record.e_content(), settings.framing());

    let Some(decoded) = content.content.as_ref() else {
        return SignedContentOutcome {
            content: content.result,
            signature: ValidationResult::not_applicable(SIGNATURE_VALIDATOR_NAME, Some(CONTENT_NOT_DECODED)),
            data_groups: DataGroupReport::not_checked(record.data_group_hashes(), CONTENT_NOT_DECODED),
        };
    };

    let signature = verify_signature(
        record.e_content(),
        record.encrypted_digest(),
        record.public_key(),
        record.signature_algorithm(),
        settings.signature(),
    );

    let raw_content = Some(record.data_group_content())
        .filter(|c| settings.recompute_data_group_hashes() && !c.is_empty());
    let data_groups = verify_data_groups(record.data_group_hashes(), decoded, raw_content);

    SignedContentOutcome {
        content: content.result,
        signature,
        data_groups,
    }
}
