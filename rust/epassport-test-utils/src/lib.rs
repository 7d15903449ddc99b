// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test-only fixtures for the epassport crates.
//!
//! This crate keeps DER construction, sample MRZs, and signing keys out of the
//! production crates while letting every crate's tests build realistic records.

use epassport_common::{compute_check_digit, HashAlgorithm};
use once_cell::sync::Lazy;
use rand_core::OsRng;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

pub mod der {
    //! Minimal DER encoders for building fixtures.

    pub fn length(len: usize) -> Vec<u8> {
        if len < 0x80 {
            return vec![len as u8];
        }
        let bytes: Vec<u8> = len.to_be_bytes().into_iter().skip_while(|b| *b == 0).collect();
        let mut out = vec![0x80 | bytes.len() as u8];
        out.extend(bytes);
        out
    }

    pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        out.extend(length(content.len()));
        out.extend_from_slice(content);
        out
    }

    pub fn integer(value: u64) -> Vec<u8> {
        let mut bytes: Vec<u8> = value.to_be_bytes().into_iter().skip_while(|b| *b == 0).collect();
        if bytes.is_empty() || bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0);
        }
        tlv(0x02, &bytes)
    }

    pub fn octet_string(bytes: &[u8]) -> Vec<u8> {
        tlv(0x04, bytes)
    }

    pub fn null() -> Vec<u8> {
        vec![0x05, 0x00]
    }

    pub fn oid(arcs: &[u64]) -> Vec<u8> {
        let mut content = Vec::new();
        let mut push_arc = |mut arc: u64| {
            let mut chunk = vec![(arc & 0x7f) as u8];
            arc >>= 7;
            while arc > 0 {
                chunk.push(0x80 | (arc & 0x7f) as u8);
                arc >>= 7;
            }
            chunk.reverse();
            content.extend(chunk);
        };
        push_arc(arcs[0] * 40 + arcs[1]);
        for &arc in &arcs[2..] {
            push_arc(arc);
        }
        tlv(0x06, &content)
    }

    pub fn printable_string(s: &str) -> Vec<u8> {
        tlv(0x13, s.as_bytes())
    }

    pub fn sequence(parts: &[Vec<u8>]) -> Vec<u8> {
        tlv(0x30, &parts.concat())
    }

    pub fn context_0(content: &[u8]) -> Vec<u8> {
        tlv(0xa0, content)
    }
}

/// Builds a DER `LDSSecurityObject`.
#[derive(Debug, Clone)]
pub struct LdsSecurityObjectBuilder {
    version: u64,
    hash_oid: Vec<u64>,
    null_parameters: bool,
    groups: Vec<(u64, Vec<u8>)>,
    lds_version: Option<(String, String)>,
}

impl LdsSecurityObjectBuilder {
    pub fn new(hash: HashAlgorithm) -> Self {
        Self {
            version: 0,
            hash_oid: hash.oid().to_vec(),
            null_parameters: true,
            groups: Vec::new(),
            lds_version: None,
        }
    }

    pub fn hash_oid(mut self, arcs: &[u64]) -> Self {
        self.hash_oid = arcs.to_vec();
        self
    }

    pub fn without_parameters(mut self) -> Self {
        self.null_parameters = false;
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn lds_version(mut self, lds: &str, unicode: &str) -> Self {
        self.lds_version = Some((lds.to_string(), unicode.to_string()));
        self
    }

    pub fn group(mut self, number: u64, hash: impl Into<Vec<u8>>) -> Self {
        self.groups.push((number, hash.into()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut algorithm = vec![der::oid(&self.hash_oid)];
        if self.null_parameters {
            algorithm.push(der::null());
        }

        let groups: Vec<Vec<u8>> = self
            .groups
            .iter()
            .map(|(n, h)| der::sequence(&[der::integer(*n), der::octet_string(h)]))
            .collect();

        let mut fields = vec![
            der::integer(self.version),
            der::sequence(&algorithm),
            der::sequence(&groups),
        ];
        if let Some((lds, unicode)) = &self.lds_version {
            fields.push(der::sequence(&[der::printable_string(lds), der::printable_string(unicode)]));
        }
        der::sequence(&fields)
    }

    /// The object wrapped in an `EncapsulatedContentInfo`.
    pub fn build_encapsulated(&self) -> Vec<u8> {
        der::sequence(&[
            der::oid(&[2, 23, 136, 1, 1, 1]),
            der::context_0(&der::octet_string(&self.build())),
        ])
    }
}

/// Raw data-group content and its hash, for fixtures.
pub fn data_group(number: u32, alg: HashAlgorithm) -> (Vec<u8>, Vec<u8>) {
    let content = format!("data group {number} content").into_bytes();
    let hash = alg.digest(&content);
    (content, hash)
}

pub mod mrz {
    //! Sample MRZs.

    use super::compute_check_digit;

    /// ICAO 9303-4 specimen (TD3).
    pub const SPECIMEN_TD3: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\nL898902C36UTO7408122F1204159ZE184226B<<<<<10";

    /// ICAO 9303-5 specimen (TD2).
    pub const SPECIMEN_TD2: &str = "I<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<\nD231458907UTO7408122F1204159<<<<<<<6";

    /// ICAO 9303-5 specimen (TD1).
    pub const SPECIMEN_TD1: &str =
        "I<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";

    fn digit(data: &str) -> char {
        let d = compute_check_digit(data).expect("fixture data uses MRZ characters");
        char::from(b'0' + d)
    }

    fn pad(s: &str, len: usize) -> String {
        format!("{s:<<len$}")
    }

    /// Build a TD3 MRZ with correct check digits.
    pub fn td3(name: &str, document_number: &str, birth: &str, sex: char, expiry: &str, optional: &str) -> String {
        let line1 = pad(&format!("P<UTO{name}"), 44);
        let number = pad(document_number, 9);
        let optional = pad(optional, 14);
        let optional_digit = if optional.chars().all(|c| c == '<') { '<' } else { digit(&optional) };

        let body = format!(
            "{number}{}UTO{birth}{}{sex}{expiry}{}{optional}{optional_digit}",
            digit(&number),
            digit(birth),
            digit(expiry),
        );
        let composite = format!("{}{}{}", &body[0..10], &body[13..20], &body[21..43]);
        format!("{line1}\n{body}{}", digit(&composite))
    }
}

static RSA_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate RSA test key"));

static OTHER_RSA_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate RSA test key"));

static P256_KEY: Lazy<p256::ecdsa::SigningKey> = Lazy::new(|| p256::ecdsa::SigningKey::random(&mut OsRng));

static P384_KEY: Lazy<p384::ecdsa::SigningKey> = Lazy::new(|| p384::ecdsa::SigningKey::random(&mut OsRng));

static P521_KEY: Lazy<p521::ecdsa::SigningKey> = Lazy::new(|| p521::ecdsa::SigningKey::random(&mut OsRng));

/// Shared 1024-bit RSA key (generated once per test binary).
pub fn rsa_key() -> &'static RsaPrivateKey {
    &RSA_KEY
}

pub fn other_rsa_key() -> &'static RsaPrivateKey {
    &OTHER_RSA_KEY
}

pub fn p256_key() -> &'static p256::ecdsa::SigningKey {
    &P256_KEY
}

pub fn p384_key() -> &'static p384::ecdsa::SigningKey {
    &P384_KEY
}

pub fn p521_key() -> &'static p521::ecdsa::SigningKey {
    &P521_KEY
}

/// Big-endian modulus of an RSA key.
pub fn rsa_modulus(key: &RsaPrivateKey) -> Vec<u8> {
    use rsa::traits::PublicKeyParts as _;
    key.n().to_bytes_be()
}

/// RSA PKCS#1 v1.5 signature over `digest(msg)`.
pub fn sign_rsa_pkcs1(key: &RsaPrivateKey, digest: HashAlgorithm, msg: &[u8]) -> Vec<u8> {
    let hashed = digest.digest(msg);
    let scheme = match digest {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    };
    key.sign(scheme, &hashed).expect("RSA PKCS#1 v1.5 signing")
}

/// RSA-PSS signature over `digest(msg)`, MGF1 and salt length following the digest.
///
/// A 1024-bit key is too short for PSS with SHA-512.
pub fn sign_rsa_pss(key: &RsaPrivateKey, digest: HashAlgorithm, msg: &[u8]) -> Vec<u8> {
    let hashed = digest.digest(msg);
    let scheme = match digest {
        HashAlgorithm::Sha1 => Pss::new::<Sha1>(),
        HashAlgorithm::Sha224 => Pss::new::<Sha224>(),
        HashAlgorithm::Sha256 => Pss::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pss::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pss::new::<Sha512>(),
    };
    key.sign_with_rng(&mut OsRng, scheme, &hashed).expect("RSA-PSS signing")
}

pub fn sign_rsa_pkcs1_sha256(key: &RsaPrivateKey, msg: &[u8]) -> Vec<u8> {
    sign_rsa_pkcs1(key, HashAlgorithm::Sha256, msg)
}

pub fn sign_rsa_pss_sha256(key: &RsaPrivateKey, msg: &[u8]) -> Vec<u8> {
    sign_rsa_pss(key, HashAlgorithm::Sha256, msg)
}

pub fn sign_rsa_pkcs1_sha384(key: &RsaPrivateKey, msg: &[u8]) -> Vec<u8> {
    sign_rsa_pkcs1(key, HashAlgorithm::Sha384, msg)
}

/// Uncompressed SEC1 point of a P-256 key.
pub fn p256_point(key: &p256::ecdsa::SigningKey) -> Vec<u8> {
    key.verifying_key().to_encoded_point(false).as_bytes().to_vec()
}

pub fn p384_point(key: &p384::ecdsa::SigningKey) -> Vec<u8> {
    key.verifying_key().to_encoded_point(false).as_bytes().to_vec()
}

pub fn p521_point(key: &p521::ecdsa::SigningKey) -> Vec<u8> {
    p521::ecdsa::VerifyingKey::from(key).to_encoded_point(false).as_bytes().to_vec()
}

/// ECDSA P-256 / SHA-256 signature, DER encoded.
pub fn sign_p256_der(key: &p256::ecdsa::SigningKey, msg: &[u8]) -> Vec<u8> {
    use signature::Signer as _;
    let sig: p256::ecdsa::Signature = key.sign(msg);
    sig.to_der().as_bytes().to_vec()
}

/// ECDSA P-256 / SHA-256 signature as raw `r || s`.
pub fn sign_p256_raw(key: &p256::ecdsa::SigningKey, msg: &[u8]) -> Vec<u8> {
    use signature::Signer as _;
    let sig: p256::ecdsa::Signature = key.sign(msg);
    sig.to_bytes().to_vec()
}

/// ECDSA P-384 / SHA-384 signature, DER encoded.
pub fn sign_p384_der(key: &p384::ecdsa::SigningKey, msg: &[u8]) -> Vec<u8> {
    use signature::Signer as _;
    let sig: p384::ecdsa::Signature = key.sign(msg);
    sig.to_der().as_bytes().to_vec()
}

/// ECDSA P-256 signature over an arbitrary prehash.
pub fn sign_p256_prehash(key: &p256::ecdsa::SigningKey, prehash: &[u8]) -> Vec<u8> {
    use signature::hazmat::PrehashSigner as _;
    let sig: p256::ecdsa::Signature = key.sign_prehash(prehash).expect("P-256 prehash signing");
    sig.to_der().as_bytes().to_vec()
}

/// ECDSA P-521 signature over a prehash, DER encoded.
///
/// Prehashes shorter than the 66-byte field are left-padded with zeros first.
pub fn sign_p521_prehash(key: &p521::ecdsa::SigningKey, prehash: &[u8]) -> Vec<u8> {
    use signature::hazmat::PrehashSigner as _;
    let mut field = vec![0u8; 66usize.saturating_sub(prehash.len())];
    field.extend_from_slice(prehash);
    let sig: p521::ecdsa::Signature = key.sign_prehash(&field).expect("P-521 prehash signing");
    sig.to_der().as_bytes().to_vec()
}
