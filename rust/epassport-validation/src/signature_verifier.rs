// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Document-signer signature verification.
//!
//! The signature (`encryptedDigest`) is verified over the exact `eContent`
//! bytes:
//! 1) parse the declared algorithm identifier
//! 2) check that the key shape matches the algorithm family
//! 3) resolve the digest (override, identifier, configured default)
//! 4) hash `eContent` and verify with RSA PKCS#1 v1.5, RSA-PSS or ECDSA
//!
//! Each step has its own failure code so a wrong key type is never reported
//! as a bad signature.

use std::borrow::Cow;

use epassport_common::HashAlgorithm;
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::digest::const_oid::AssociatedOid;
use sha2::digest::{Digest, DynDigest};
use signature::hazmat::PrehashVerifier as _;
use thiserror::Error;
use tracing::debug;

use crate::public_key::{NamedCurve, PublicKey};
use crate::signature_algorithm::{SignatureAlgorithm, SignatureFamily, SignatureScheme};
use crate::validation_result::{ErrorCode, ValidationResult};

pub const SIGNATURE_VALIDATOR_NAME: &str = "Signature";

/// Conventional RSA public exponent (F4).
pub const DEFAULT_RSA_EXPONENT: u64 = 65537;

/// Largest RSA modulus accepted, in bits.
const MAX_RSA_MODULUS_BITS: usize = 8192;

/// Digest and key defaults applied during signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureSettings {
    /// Digest for bare identifiers such as `RSA` or `ECDSA`.
    pub default_digest: Option<HashAlgorithm>,
    /// Digest used regardless of what the identifier names.
    pub digest_override: Option<HashAlgorithm>,
    /// Exponent for RSA keys that carry only a modulus.
    pub default_rsa_exponent: u64,
}

impl Default for SignatureSettings {
    fn default() -> Self {
        Self {
            default_digest: None,
            digest_override: None,
            default_rsa_exponent: DEFAULT_RSA_EXPONENT,
        }
    }
}

impl SignatureSettings {
    pub fn with_default_digest(mut self, digest: HashAlgorithm) -> Self {
        self.default_digest = Some(digest);
        self
    }

    pub fn with_digest_override(mut self, digest: HashAlgorithm) -> Self {
        self.digest_override = Some(digest);
        self
    }

    pub fn with_default_rsa_exponent(mut self, exponent: u64) -> Self {
        self.default_rsa_exponent = exponent;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("{key:?} public key cannot verify a {algorithm} signature")]
    KeyShapeMismatch {
        algorithm: SignatureAlgorithm,
        key: SignatureFamily,
    },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signature invalid: {0}")]
    SignatureInvalid(String),
}

impl SignatureError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SignatureError::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            SignatureError::KeyShapeMismatch { .. } => ErrorCode::KeyShapeMismatch,
            SignatureError::InvalidPublicKey(_) => ErrorCode::InvalidPublicKey,
            SignatureError::SignatureInvalid(_) => ErrorCode::SignatureInvalid,
        }
    }
}

/// What a successful verification used.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VerifiedSignature {
    pub algorithm: SignatureAlgorithm,
    pub digest: HashAlgorithm,
}

/// Verify `encrypted_digest` over `e_content` and report a stage result.
///
/// On success the metadata records the resolved algorithm and digest.
pub fn verify_signature(
    e_content: &[u8],
    encrypted_digest: &[u8],
    public_key: &PublicKey,
    algorithm: &str,
    settings: &SignatureSettings,
) -> ValidationResult {
    match check_signature(e_content, encrypted_digest, public_key, algorithm, settings) {
        Ok(verified) => ValidationResult::success(SIGNATURE_VALIDATOR_NAME, None)
            .with_metadata("Algorithm", verified.algorithm.to_string())
            .with_metadata("Digest", verified.digest.name()),
        Err(e) => {
            debug!(code = %e.code(), error = %e, "signature check failed");
            ValidationResult::failure_message(SIGNATURE_VALIDATOR_NAME, e.to_string(), e.code())
        }
    }
}

/// Parse `algorithm` and verify.
pub fn check_signature(
    e_content: &[u8],
    encrypted_digest: &[u8],
    public_key: &PublicKey,
    algorithm: &str,
    settings: &SignatureSettings,
) -> Result<VerifiedSignature, SignatureError> {
    let algorithm = algorithm
        .parse::<SignatureAlgorithm>()
        .map_err(|e| SignatureError::UnsupportedAlgorithm(e.to_string()))?;
    check_signature_with(e_content, encrypted_digest, public_key, algorithm, settings)
}

/// Verify with an already parsed algorithm.
pub fn check_signature_with(
    e_content: &[u8],
    encrypted_digest: &[u8],
    public_key: &PublicKey,
    algorithm: SignatureAlgorithm,
    settings: &SignatureSettings,
) -> Result<VerifiedSignature, SignatureError> {
    if algorithm.family() != public_key.family() {
        return Err(SignatureError::KeyShapeMismatch {
            algorithm,
            key: public_key.family(),
        });
    }

    let digest = settings
        .digest_override
        .or(algorithm.digest)
        .or(settings.default_digest)
        .ok_or_else(|| {
            SignatureError::UnsupportedAlgorithm(format!("{algorithm} names no digest and no default digest is configured"))
        })?;
    let prehash = digest.digest(e_content);

    match public_key {
        PublicKey::Rsa { modulus, exponent } => {
            let key = rsa_public_key(modulus, exponent.as_deref(), settings.default_rsa_exponent)?;
            verify_rsa(&key, algorithm.scheme, digest, &prehash, encrypted_digest)?;
        }
        PublicKey::Ec {
            curve_name,
            public_key_q,
        } => {
            let curve = curve_name
                .parse::<NamedCurve>()
                .map_err(SignatureError::UnsupportedAlgorithm)?;
            verify_ecdsa(curve, &curve.sec1_point(public_key_q), &prehash, encrypted_digest)?;
        }
    }

    Ok(VerifiedSignature { algorithm, digest })
}

fn verification_failed() -> SignatureError {
    SignatureError::SignatureInvalid("signature verification failed".to_string())
}

fn rsa_public_key(modulus: &[u8], exponent: Option<&[u8]>, default_exponent: u64) -> Result<RsaPublicKey, SignatureError> {
    if modulus.iter().all(|&b| b == 0) {
        return Err(SignatureError::InvalidPublicKey("RSA modulus is empty".to_string()));
    }
    let n = BigUint::from_bytes_be(modulus);
    let e = match exponent {
        Some(e) => BigUint::from_bytes_be(e),
        None => BigUint::from(default_exponent),
    };
    RsaPublicKey::new_with_max_size(n, e, MAX_RSA_MODULUS_BITS)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad RSA public key: {e}")))
}

fn verify_rsa(
    key: &RsaPublicKey,
    scheme: SignatureScheme,
    digest: HashAlgorithm,
    prehash: &[u8],
    sig: &[u8],
) -> Result<(), SignatureError> {
    let outcome = match digest {
        HashAlgorithm::Sha1 => verify_rsa_with::<sha1::Sha1>(key, scheme, prehash, sig),
        HashAlgorithm::Sha224 => verify_rsa_with::<sha2::Sha224>(key, scheme, prehash, sig),
        HashAlgorithm::Sha256 => verify_rsa_with::<sha2::Sha256>(key, scheme, prehash, sig),
        HashAlgorithm::Sha384 => verify_rsa_with::<sha2::Sha384>(key, scheme, prehash, sig),
        HashAlgorithm::Sha512 => verify_rsa_with::<sha2::Sha512>(key, scheme, prehash, sig),
    };
    outcome.map_err(|_| verification_failed())
}

fn verify_rsa_with<D>(key: &RsaPublicKey, scheme: SignatureScheme, prehash: &[u8], sig: &[u8]) -> rsa::Result<()>
where
    D: Digest + DynDigest + AssociatedOid + Send + Sync + 'static,
{
    match scheme {
        SignatureScheme::RsaPss => key.verify(Pss::new::<D>(), prehash, sig),
        SignatureScheme::RsaPkcs1v15 | SignatureScheme::Ecdsa => key.verify(Pkcs1v15Sign::new::<D>(), prehash, sig),
    }
}

/// Left-pad a digest shorter than the curve's field.
fn field_sized_prehash(prehash: &[u8], field_len: usize) -> Cow<'_, [u8]> {
    if prehash.len() >= field_len {
        Cow::Borrowed(prehash)
    } else {
        let mut padded = vec![0u8; field_len - prehash.len()];
        padded.extend_from_slice(prehash);
        Cow::Owned(padded)
    }
}

fn verify_ecdsa(curve: NamedCurve, point: &[u8], prehash: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let prehash = field_sized_prehash(prehash, curve.field_len());
    match curve {
        NamedCurve::P256 => verify_ecdsa_p256(point, &prehash, sig),
        NamedCurve::P384 => verify_ecdsa_p384(point, &prehash, sig),
        NamedCurve::P521 => verify_ecdsa_p521(point, &prehash, sig),
    }
}

// Signatures arrive either as a DER `Ecdsa-Sig-Value` or as raw `r || s`.

fn verify_ecdsa_p256(point: &[u8], prehash: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad P-256 public key: {e}")))?;
    let signature = p256::ecdsa::Signature::from_der(sig)
        .or_else(|_| p256::ecdsa::Signature::from_slice(sig))
        .map_err(|e| SignatureError::SignatureInvalid(format!("bad P-256 signature encoding: {e}")))?;
    vk.verify_prehash(prehash, &signature).map_err(|_| verification_failed())
}

fn verify_ecdsa_p384(point: &[u8], prehash: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad P-384 public key: {e}")))?;
    let signature = p384::ecdsa::Signature::from_der(sig)
        .or_else(|_| p384::ecdsa::Signature::from_slice(sig))
        .map_err(|e| SignatureError::SignatureInvalid(format!("bad P-384 signature encoding: {e}")))?;
    vk.verify_prehash(prehash, &signature).map_err(|_| verification_failed())
}

fn verify_ecdsa_p521(point: &[u8], prehash: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad P-521 public key: {e}")))?;
    let signature = p521::ecdsa::Signature::from_der(sig)
        .or_else(|_| p521::ecdsa::Signature::from_slice(sig))
        .map_err(|e| SignatureError::SignatureInvalid(format!("bad P-521 signature encoding: {e}")))?;
    vk.verify_prehash(prehash, &signature).map_err(|_| verification_failed())
}
