// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for `epassport` integration tests.
//!
//! Every record built here is genuinely signed: the LDS Security Object
//! attests SHA-256 hashes of DG1 and DG2, and `encryptedDigest` is a real
//! signature over it.

#![allow(dead_code)]

use epassport::{DocumentRecord, DocumentRecordBuilder, HashAlgorithm, PublicKey};
use epassport_test_utils as tu;
use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
});

pub(crate) fn init_tracing() {
    Lazy::force(&TRACING);
}

pub(crate) const DATA_GROUPS: [u32; 2] = [1, 2];

/// Raw content and SHA-256 hash per data group.
pub(crate) fn data_groups() -> Vec<(u32, Vec<u8>, Vec<u8>)> {
    DATA_GROUPS
        .iter()
        .map(|&n| {
            let (content, hash) = tu::data_group(n, HashAlgorithm::Sha256);
            (n, content, hash)
        })
        .collect()
}

pub(crate) fn lds_security_object() -> tu::LdsSecurityObjectBuilder {
    data_groups()
        .into_iter()
        .fold(tu::LdsSecurityObjectBuilder::new(HashAlgorithm::Sha256), |b, (n, _, h)| {
            b.group(u64::from(n), h)
        })
}

/// Builder with MRZ and declared hashes filled in.
pub(crate) fn base_builder() -> DocumentRecordBuilder {
    data_groups()
        .into_iter()
        .fold(DocumentRecord::builder().mrz(tu::mrz::SPECIMEN_TD3), |b, (n, _, h)| {
            b.data_group_hash(n, h)
        })
}

pub(crate) fn rsa_public_key() -> PublicKey {
    PublicKey::rsa(tu::rsa_modulus(tu::rsa_key()))
}

/// RSA PKCS#1 v1.5 / SHA-256 record over a bare LDS Security Object.
pub(crate) fn rsa_builder() -> DocumentRecordBuilder {
    let e_content = lds_security_object().build();
    let signature = tu::sign_rsa_pkcs1_sha256(tu::rsa_key(), &e_content);
    base_builder()
        .signature_algorithm("sha256WithRSAEncryption")
        .public_key(rsa_public_key())
        .e_content(e_content)
        .encrypted_digest(signature)
}

pub(crate) fn rsa_record() -> DocumentRecord {
    rsa_builder().build().expect("valid record")
}

/// ECDSA P-256 / SHA-256 record.
pub(crate) fn ecdsa_record() -> DocumentRecord {
    let e_content = lds_security_object().build();
    let signature = tu::sign_p256_der(tu::p256_key(), &e_content);
    base_builder()
        .signature_algorithm("ecdsa-with-SHA256")
        .public_key(PublicKey::ec("prime256v1", tu::p256_point(tu::p256_key())))
        .e_content(e_content)
        .encrypted_digest(signature)
        .build()
        .expect("valid record")
}

/// Signed record whose `eContent` is the given bytes.
pub(crate) fn rsa_record_over(e_content: Vec<u8>) -> DocumentRecord {
    let signature = tu::sign_rsa_pkcs1_sha256(tu::rsa_key(), &e_content);
    base_builder()
        .signature_algorithm("sha256WithRSAEncryption")
        .public_key(rsa_public_key())
        .e_content(e_content)
        .encrypted_digest(signature)
        .build()
        .expect("valid record")
}
