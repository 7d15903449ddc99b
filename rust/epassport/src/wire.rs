// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `PassportData`: the JSON form document readers emit.
//!
//! ```json
//! { "mrz": "...", "signatureAlgorithm": "sha256WithRSAEncryption",
//!   "pubKey": { "modulus": "...", "curveName": "...", "publicKeyQ": "..." },
//!   "dataGroupHashes": [[1, [..]], [2, [..]]],
//!   "eContent": [..], "encryptedDigest": [..] }
//! ```
//!
//! Byte arrays may be signed (`-128..=127`) or unsigned (`0..=255`).

use epassport_common::DataGroupHash;
use epassport_validation::{NamedCurve, PublicKey};
use rsa::BigUint;
use serde::{Deserialize, Serialize};

use crate::record::{DocumentRecord, RecordError};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePublicKey {
    /// Hex (optionally `0x`-prefixed) or decimal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_name: Option<String>,
    /// Hex SEC1 point, hex `x || y`, or `(x,y)` in hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportData {
    pub mrz: String,
    pub signature_algorithm: String,
    pub pub_key: WirePublicKey,
    #[serde(default)]
    pub data_group_hashes: Vec<(u32, Vec<i16>)>,
    pub e_content: Vec<i16>,
    pub encrypted_digest: Vec<i16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_group_content: Vec<(u32, Vec<i16>)>,
}

impl PassportData {
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl TryFrom<PassportData> for DocumentRecord {
    type Error = RecordError;

    fn try_from(wire: PassportData) -> Result<Self, Self::Error> {
        let mut builder = DocumentRecord::builder()
            .mrz(wire.mrz)
            .signature_algorithm(wire.signature_algorithm)
            .public_key(public_key(&wire.pub_key)?)
            .e_content(bytes("eContent", &wire.e_content)?)
            .encrypted_digest(bytes("encryptedDigest", &wire.encrypted_digest)?);

        for (number, hash) in &wire.data_group_hashes {
            builder = builder.data_group_hash(*number, bytes("dataGroupHashes", hash)?);
        }
        for (number, content) in &wire.data_group_content {
            builder = builder.data_group_content(*number, bytes("dataGroupContent", content)?);
        }
        builder.build()
    }
}

impl From<&DocumentRecord> for PassportData {
    fn from(record: &DocumentRecord) -> Self {
        let unsigned = |b: &[u8]| b.iter().map(|&x| i16::from(x)).collect::<Vec<_>>();
        let pub_key = match record.public_key() {
            PublicKey::Rsa { modulus, exponent } => WirePublicKey {
                modulus: Some(hex::encode(modulus)),
                exponent: exponent.as_deref().map(hex::encode),
                ..WirePublicKey::default()
            },
            PublicKey::Ec {
                curve_name,
                public_key_q,
            } => WirePublicKey {
                curve_name: Some(curve_name.clone()),
                public_key_q: Some(hex::encode(public_key_q)),
                ..WirePublicKey::default()
            },
        };

        PassportData {
            mrz: record.mrz().to_string(),
            signature_algorithm: record.signature_algorithm().to_string(),
            pub_key,
            data_group_hashes: record
                .data_group_hashes()
                .iter()
                .map(|DataGroupHash { number, hash }| (*number, unsigned(hash)))
                .collect(),
            e_content: unsigned(record.e_content()),
            encrypted_digest: unsigned(record.encrypted_digest()),
            data_group_content: record
                .data_group_content()
                .iter()
                .map(|(n, c)| (*n, unsigned(c)))
                .collect(),
        }
    }
}

fn bytes(field: &'static str, values: &[i16]) -> Result<Vec<u8>, RecordError> {
    values
        .iter()
        .map(|&v| match v {
            // Two's complement for signed bytes.
            -128..=-1 => Ok((v + 256) as u8),
            0..=255 => Ok(v as u8),
            _ => Err(RecordError::InvalidField {
                field,
                reason: format!("{v} is not a byte value"),
            }),
        })
        .collect()
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn public_key(wire: &WirePublicKey) -> Result<PublicKey, RecordError> {
    let modulus = non_empty(&wire.modulus);
    let curve = non_empty(&wire.curve_name);
    let q = non_empty(&wire.public_key_q);

    match (modulus, curve, q) {
        (Some(m), None, None) => {
            let modulus = integer("pubKey.modulus", m)?;
            match non_empty(&wire.exponent) {
                Some(e) => Ok(PublicKey::rsa_with_exponent(modulus, integer("pubKey.exponent", e)?)),
                None => Ok(PublicKey::rsa(modulus)),
            }
        }
        (None, Some(curve), Some(q)) => Ok(PublicKey::ec(curve, point(curve, q)?)),
        _ => Err(RecordError::AmbiguousPublicKey),
    }
}

/// Big-endian bytes of a hex or decimal integer.
///
/// A string of decimal digits without a `0x` prefix is read as decimal.
fn integer(field: &'static str, s: &str) -> Result<Vec<u8>, RecordError> {
    let invalid = |reason: String| RecordError::InvalidField { field, reason };

    let (digits, force_hex) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    if !force_hex && digits.bytes().all(|b| b.is_ascii_digit()) {
        return BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(|n| n.to_bytes_be())
            .ok_or_else(|| invalid("not a decimal integer".to_string()));
    }
    hex_bytes(digits).map_err(invalid)
}

fn hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if s.len() % 2 == 1 {
        hex::decode(format!("0{s}")).map_err(|e| e.to_string())
    } else {
        hex::decode(s).map_err(|e| e.to_string())
    }
}

/// Normalize `publicKeyQ` to SEC1.
fn point(curve: &str, q: &str) -> Result<Vec<u8>, RecordError> {
    let invalid = |reason: String| RecordError::InvalidField {
        field: "pubKey.publicKeyQ",
        reason,
    };

    let Some(coordinates) = q.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) else {
        return hex_bytes(q).map_err(invalid);
    };

    let (x, y) = coordinates
        .split_once(',')
        .ok_or_else(|| invalid("expected `(x,y)`".to_string()))?;
    let x = hex_bytes(x.trim()).map_err(invalid)?;
    let y = hex_bytes(y.trim()).map_err(invalid)?;

    // Coordinates may have lost their leading zeros.
    let width = match curve.parse::<NamedCurve>() {
        Ok(c) => c.field_len(),
        Err(_) => x.len().max(y.len()),
    };
    if x.len() > width || y.len() > width {
        return Err(invalid(format!("coordinate longer than {width} bytes")));
    }

    let mut sec1 = Vec::with_capacity(1 + 2 * width);
    sec1.push(0x04);
    for coordinate in [x, y] {
        sec1.resize(sec1.len() + width - coordinate.len(), 0);
        sec1.extend_from_slice(&coordinate);
    }
    Ok(sec1)
}
