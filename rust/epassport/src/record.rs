// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The document record submitted for verification.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use epassport_common::DataGroupHash;
use epassport_validation::PublicKey;
use thiserror::Error;

use crate::wire::PassportData;

/// Caller errors: the record itself cannot be formed.
///
/// Findings about the document (bad digits, tampering, bad signatures) are
/// never reported here; they end up in the `VerificationResult`.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("data group {0} is listed more than once")]
    DuplicateDataGroup(u32),

    #[error("public key must carry either an RSA modulus or an EC curve name and point")]
    AmbiguousPublicKey,

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An immutable ePassport record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    mrz: String,
    signature_algorithm: String,
    public_key: PublicKey,
    data_group_hashes: Vec<DataGroupHash>,
    e_content: Vec<u8>,
    encrypted_digest: Vec<u8>,
    data_group_content: BTreeMap<u32, Vec<u8>>,
}

impl DocumentRecord {
    pub fn builder() -> DocumentRecordBuilder {
        DocumentRecordBuilder::default()
    }

    /// Parse the `PassportData` JSON form.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let wire: PassportData = serde_json::from_str(json)?;
        Self::try_from(wire)
    }

    pub fn mrz(&self) -> &str {
        &self.mrz
    }

    /// Algorithm identifier as supplied; parsed during verification.
    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// In declared order.
    pub fn data_group_hashes(&self) -> &[DataGroupHash] {
        &self.data_group_hashes
    }

    pub fn e_content(&self) -> &[u8] {
        &self.e_content
    }

    pub fn encrypted_digest(&self) -> &[u8] {
        &self.encrypted_digest
    }

    /// Raw data-group bytes, keyed by group number.
    pub fn data_group_content(&self) -> &BTreeMap<u32, Vec<u8>> {
        &self.data_group_content
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRecordBuilder {
    mrz: Option<String>,
    signature_algorithm: Option<String>,
    public_key: Option<PublicKey>,
    data_group_hashes: Vec<DataGroupHash>,
    e_content: Option<Vec<u8>>,
    encrypted_digest: Option<Vec<u8>>,
    data_group_content: Vec<(u32, Vec<u8>)>,
}

impl DocumentRecordBuilder {
    pub fn mrz(mut self, mrz: impl Into<String>) -> Self {
        self.mrz = Some(mrz.into());
        self
    }

    pub fn signature_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.signature_algorithm = Some(algorithm.into());
        self
    }

    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    pub fn data_group_hash(mut self, number: u32, hash: impl Into<Vec<u8>>) -> Self {
        self.data_group_hashes.push(DataGroupHash::new(number, hash));
        self
    }

    pub fn data_group_hashes(mut self, hashes: impl IntoIterator<Item = DataGroupHash>) -> Self {
        self.data_group_hashes.extend(hashes);
        self
    }

    pub fn e_content(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.e_content = Some(bytes.into());
        self
    }

    pub fn encrypted_digest(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.encrypted_digest = Some(bytes.into());
        self
    }

    /// Attach raw data-group bytes for hash recomputation.
    pub fn data_group_content(mut self, number: u32, bytes: impl Into<Vec<u8>>) -> Self {
        self.data_group_content.push((number, bytes.into()));
        self
    }

    pub fn build(self) -> Result<DocumentRecord, RecordError> {
        let mrz = self.mrz.ok_or(RecordError::MissingField("mrz"))?;
        let signature_algorithm = self
            .signature_algorithm
            .ok_or(RecordError::MissingField("signature_algorithm"))?;
        let public_key = self.public_key.ok_or(RecordError::MissingField("public_key"))?;
        let e_content = self.e_content.ok_or(RecordError::MissingField("e_content"))?;
        let encrypted_digest = self
            .encrypted_digest
            .ok_or(RecordError::MissingField("encrypted_digest"))?;

        let key_is_empty = match &public_key {
            PublicKey::Rsa { modulus, .. } => modulus.is_empty(),
            PublicKey::Ec {
                curve_name,
                public_key_q,
            } => curve_name.trim().is_empty() || public_key_q.is_empty(),
        };
        if key_is_empty {
            return Err(RecordError::AmbiguousPublicKey);
        }

        let mut seen = BTreeSet::new();
        if let Some(dup) = self.data_group_hashes.iter().find(|dg| !seen.insert(dg.number)) {
            return Err(RecordError::DuplicateDataGroup(dup.number));
        }

        let mut data_group_content = BTreeMap::new();
        for (number, bytes) in self.data_group_content {
            match data_group_content.entry(number) {
                Entry::Vacant(slot) => {
                    slot.insert(bytes);
                }
                Entry::Occupied(_) => return Err(RecordError::DuplicateDataGroup(number)),
            }
        }

        Ok(DocumentRecord {
            mrz,
            signature_algorithm,
            public_key,
            data_group_hashes: self.data_group_hashes,
            e_content,
            encrypted_digest,
            data_group_content,
        })
    }
}
