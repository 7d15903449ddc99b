// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoder for the signed content of an ePassport (ICAO 9303-10 `LDSSecurityObject`).
//!
//! ```text
//! LDSSecurityObject ::= SEQUENCE {
//!   version              INTEGER,
//!   hashAlgorithm        AlgorithmIdentifier,
//!   dataGroupHashValues  SEQUENCE OF DataGroupHash,
//!   ldsVersionInfo       LDSVersionInfo OPTIONAL }
//!
//! DataGroupHash ::= SEQUENCE { dataGroupNumber INTEGER, dataGroupHashValue OCTET STRING }
//! LDSVersionInfo ::= SEQUENCE { ldsVersion PrintableString, unicodeVersion PrintableString }
//! ```
//!
//! Each production is one function over a [`DerReader`]; every function
//! consumes exactly its own element.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::der_reader::{tag, DecodeError, DerReader};
use crate::hash_algorithm::HashAlgorithm;
use crate::oid::{ObjectIdentifier, ID_LDS_SECURITY_OBJECT};

/// Highest data-group number defined by ICAO 9303.
pub const MAX_DATA_GROUP_NUMBER: u32 = 16;

/// How the LDS Security Object is framed inside `eContent`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFraming {
    /// `eContent` is the bare `LDSSecurityObject`.
    #[default]
    LdsSecurityObject,
    /// `eContent` is an `EncapsulatedContentInfo` whose content type is
    /// `id-icao-mrtd-security-ldsSecurityObject`.
    EncapsulatedContentInfo,
}

/// A `(data-group number, hash)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGroupHash {
    pub number: u32,
    pub hash: Vec<u8>,
}

impl DataGroupHash {
    pub fn new(number: u32, hash: impl Into<Vec<u8>>) -> Self {
        Self {
            number,
            hash: hash.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub oid: ObjectIdentifier,
    /// DER encoding of the parameters, when present.
    pub parameters: Option<Vec<u8>>,
}

impl AlgorithmIdentifier {
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_oid(&self.oid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdsVersionInfo {
    pub lds_version: String,
    pub unicode_version: String,
}

/// The logical content of a decoded `LDSSecurityObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub version: u64,
    pub hash_algorithm: AlgorithmIdentifier,
    /// In encoded order.
    pub data_group_hashes: Vec<DataGroupHash>,
    pub lds_version: Option<LdsVersionInfo>,
}

impl DecodedContent {
    pub fn attested_hash(&self, number: u32) -> Option<&[u8]> {
        self.data_group_hashes
            .iter()
            .find(|dg| dg.number == number)
            .map(|dg| dg.hash.as_slice())
    }
}

/// Decode `eContent` using the given framing.
pub fn decode_signed_content(input: &[u8], framing: ContentFraming) -> Result<DecodedContent, DecodeError> {
    match framing {
        ContentFraming::LdsSecurityObject => decode_lds_security_object(input),
        ContentFraming::EncapsulatedContentInfo => decode_encapsulated_content_info(input),
    }
}

/// Decode a bare `LDSSecurityObject`.
pub fn decode_lds_security_object(input: &[u8]) -> Result<DecodedContent, DecodeError> {
    let mut outer = DerReader::new(input);
    let mut so = outer.read_sequence()?;
    outer.finish("LDSSecurityObject")?;

    let version_offset = so.position();
    let version = so.read_unsigned()?;
    let hash_algorithm = read_algorithm_identifier(&mut so)?;
    let data_group_hashes = read_data_group_hash_values(&mut so)?;

    let lds_version = if so.is_empty() {
        None
    } else {
        Some(read_lds_version_info(&mut so)?)
    };
    so.finish("LDSSecurityObject fields")?;

    match (version, &lds_version) {
        (0, None) | (1, Some(_)) => {}
        (0, Some(_)) => return Err(invalid_version(version_offset, "version 0 must not carry ldsVersionInfo")),
        (1, None) => return Err(invalid_version(version_offset, "version 1 requires ldsVersionInfo")),
        (v, _) => return Err(invalid_version(version_offset, &format!("unsupported version {v}"))),
    }

    trace!(
        version,
        hash_algorithm = %hash_algorithm.oid,
        data_groups = data_group_hashes.len(),
        "decoded LDS security object"
    );

    Ok(DecodedContent {
        version,
        hash_algorithm,
        data_group_hashes,
        lds_version,
    })
}

/// Decode `SEQUENCE { eContentType OID, eContent [0] EXPLICIT OCTET STRING }`.
fn decode_encapsulated_content_info(input: &[u8]) -> Result<DecodedContent, DecodeError> {
    let mut outer = DerReader::new(input);
    let mut info = outer.read_sequence()?;
    outer.finish("EncapsulatedContentInfo")?;

    let content_type = info.read_oid()?;
    if !content_type.is(ID_LDS_SECURITY_OBJECT) {
        return Err(DecodeError::UnexpectedContentType {
            expected: ObjectIdentifier::new(ID_LDS_SECURITY_OBJECT).to_string(),
            found: content_type.to_string(),
        });
    }

    let mut explicit = info.read_expected(tag::CONTEXT_0)?;
    info.finish("EncapsulatedContentInfo fields")?;
    let inner = explicit.read_octet_string()?;
    explicit.finish("eContent")?;

    decode_lds_security_object(inner)
}

fn read_algorithm_identifier(r: &mut DerReader<'_>) -> Result<AlgorithmIdentifier, DecodeError> {
    let mut seq = r.read_sequence()?;
    let oid = seq.read_oid()?;
    let parameters = if seq.is_empty() {
        None
    } else {
        Some(seq.read_element()?.raw.to_vec())
    };
    seq.finish("AlgorithmIdentifier")?;
    Ok(AlgorithmIdentifier { oid, parameters })
}

fn read_data_group_hash_values(r: &mut DerReader<'_>) -> Result<Vec<DataGroupHash>, DecodeError> {
    let list_offset = r.position();
    let mut seq = r.read_sequence()?;
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();

    while !seq.is_empty() {
        let offset = seq.position();
        let dg = read_data_group_hash(&mut seq)?;
        if !seen.insert(dg.number) {
            return Err(DecodeError::InvalidValue {
                context: "DataGroupHash",
                offset,
                reason: format!("data group {} is listed more than once", dg.number),
            });
        }
        out.push(dg);
    }

    if out.is_empty() {
        return Err(DecodeError::InvalidValue {
            context: "dataGroupHashValues",
            offset: list_offset,
            reason: "no data group hashes".to_string(),
        });
    }
    Ok(out)
}

fn read_data_group_hash(r: &mut DerReader<'_>) -> Result<DataGroupHash, DecodeError> {
    let mut seq = r.read_sequence()?;
    let number_offset = seq.position();
    let number = seq.read_unsigned()?;
    let hash = seq.read_octet_string()?.to_vec();
    seq.finish("DataGroupHash")?;

    let number = u32::try_from(number)
        .ok()
        .filter(|n| (1..=MAX_DATA_GROUP_NUMBER).contains(n))
        .ok_or_else(|| DecodeError::InvalidValue {
            context: "dataGroupNumber",
            offset: number_offset,
            reason: format!("{number} is outside 1..={MAX_DATA_GROUP_NUMBER}"),
        })?;

    Ok(DataGroupHash { number, hash })
}

fn read_lds_version_info(r: &mut DerReader<'_>) -> Result<LdsVersionInfo, DecodeError> {
    let mut seq = r.read_sequence()?;
    let lds_version = seq.read_printable_string()?.to_string();
    let unicode_version = seq.read_printable_string()?.to_string();
    seq.finish("LDSVersionInfo")?;
    Ok(LdsVersionInfo {
        lds_version,
        unicode_version,
    })
}

fn invalid_version(offset: usize, reason: &str) -> DecodeError {
    DecodeError::InvalidValue {
        context: "LDSSecurityObject version",
        offset,
        reason: reason.to_string(),
    }
}
