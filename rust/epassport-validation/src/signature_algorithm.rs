// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signature algorithm identifiers.
//!
//! Issuers name the document-signer algorithm inconsistently: X.509 style
//! (`sha256WithRSAEncryption`), JCA style (`SHA256withRSA`), JOSE style
//! (`RS256`), a bare family (`RSA`, `ECDSA`, `rsassaPss`) or a dotted OID.
//! [`SignatureAlgorithm::from_str`] folds all of these into a scheme plus an
//! optional digest.

use std::fmt;
use std::str::FromStr;

use epassport_common::{HashAlgorithm, ObjectIdentifier};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SignatureScheme {
    /// RSASSA-PKCS1-v1_5.
    RsaPkcs1v15,
    /// RSASSA-PSS with MGF1 over the same digest.
    RsaPss,
    Ecdsa,
}

/// Key family a scheme requires.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SignatureFamily {
    Rsa,
    Ec,
}

impl SignatureScheme {
    pub fn family(self) -> SignatureFamily {
        match self {
            SignatureScheme::RsaPkcs1v15 | SignatureScheme::RsaPss => SignatureFamily::Rsa,
            SignatureScheme::Ecdsa => SignatureFamily::Ec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    #[error("unsupported signature algorithm `{0}`")]
    Unsupported(String),
}

/// A parsed signature algorithm.
///
/// `digest` is `None` for bare identifiers that do not name one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignatureAlgorithm {
    pub scheme: SignatureScheme,
    pub digest: Option<HashAlgorithm>,
}

use HashAlgorithm::{Sha1, Sha224, Sha256, Sha384, Sha512};
use SignatureScheme::{Ecdsa, RsaPkcs1v15, RsaPss};

/// Registered identifiers: (OID, scheme, digest).
const OID_TABLE: &[(&[u64], SignatureScheme, Option<HashAlgorithm>)] = &[
    (&[1, 2, 840, 113549, 1, 1, 1], RsaPkcs1v15, None),
    (&[1, 2, 840, 113549, 1, 1, 5], RsaPkcs1v15, Some(Sha1)),
    (&[1, 2, 840, 113549, 1, 1, 14], RsaPkcs1v15, Some(Sha224)),
    (&[1, 2, 840, 113549, 1, 1, 11], RsaPkcs1v15, Some(Sha256)),
    (&[1, 2, 840, 113549, 1, 1, 12], RsaPkcs1v15, Some(Sha384)),
    (&[1, 2, 840, 113549, 1, 1, 13], RsaPkcs1v15, Some(Sha512)),
    (&[1, 2, 840, 113549, 1, 1, 10], RsaPss, None),
    (&[1, 2, 840, 10045, 2, 1], Ecdsa, None),
    (&[1, 2, 840, 10045, 4, 1], Ecdsa, Some(Sha1)),
    (&[1, 2, 840, 10045, 4, 3, 1], Ecdsa, Some(Sha224)),
    (&[1, 2, 840, 10045, 4, 3, 2], Ecdsa, Some(Sha256)),
    (&[1, 2, 840, 10045, 4, 3, 3], Ecdsa, Some(Sha384)),
    (&[1, 2, 840, 10045, 4, 3, 4], Ecdsa, Some(Sha512)),
];

impl SignatureAlgorithm {
    pub const fn new(scheme: SignatureScheme, digest: Option<HashAlgorithm>) -> Self {
        Self { scheme, digest }
    }

    pub fn family(&self) -> SignatureFamily {
        self.scheme.family()
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        OID_TABLE
            .iter()
            .find(|(arcs, _, _)| oid.is(arcs))
            .map(|&(_, scheme, digest)| Self::new(scheme, digest))
    }

    fn from_name(name: &str) -> Option<Self> {
        let lower: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        let bare = match lower.as_str() {
            "rsa" | "rsaencryption" | "rsapkcs1" | "rsapkcs1v15" => Some(RsaPkcs1v15),
            "rsassapss" | "rsapss" | "pss" => Some(RsaPss),
            "ecdsa" | "ec" | "ecpublickey" => Some(Ecdsa),
            _ => None,
        };
        if let Some(scheme) = bare {
            return Some(Self::new(scheme, None));
        }

        // JOSE short names.
        if let (Some(prefix), Some(bits)) = (lower.get(..2), lower.get(2..)) {
            let scheme = match prefix {
                "rs" => Some(RsaPkcs1v15),
                "ps" => Some(RsaPss),
                "es" => Some(Ecdsa),
                _ => None,
            };
            let digest = match bits {
                "256" => Some(Sha256),
                "384" => Some(Sha384),
                "512" => Some(Sha512),
                _ => None,
            };
            if let (Some(scheme), Some(digest)) = (scheme, digest) {
                return Some(Self::new(scheme, Some(digest)));
            }
        }

        // `<digest>with<scheme>` (X.509 / JCA) or `ecdsawith<digest>`.
        if let Some(digest) = lower.strip_prefix("ecdsawith") {
            return digest_from_name(digest).map(|d| Self::new(Ecdsa, Some(d)));
        }
        let (digest, scheme) = lower.split_once("with")?;
        let digest = digest_from_name(digest)?;
        let scheme = match scheme {
            "rsaencryption" | "rsa" => RsaPkcs1v15,
            "rsa/pss" | "rsapss" | "rsaandmgf1" | "rsassapss" => RsaPss,
            "ecdsa" | "ecdsaencryption" => Ecdsa,
            _ => return None,
        };
        Some(Self::new(scheme, Some(digest)))
    }
}

fn digest_from_name(name: &str) -> Option<HashAlgorithm> {
    match name {
        "sha1" => Some(Sha1),
        "sha224" => Some(Sha224),
        "sha256" => Some(Sha256),
        "sha384" => Some(Sha384),
        "sha512" => Some(Sha512),
        _ => None,
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.parse::<ObjectIdentifier>() {
            Ok(oid) => Self::from_oid(&oid),
            Err(_) => Self::from_name(trimmed),
        };
        parsed.ok_or_else(|| AlgorithmError::Unsupported(s.to_string()))
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.scheme {
            RsaPkcs1v15 => "RSA",
            RsaPss => "RSASSA-PSS",
            Ecdsa => "ECDSA",
        };
        match self.digest {
            Some(d) => write!(f, "{scheme} with {d}"),
            None => f.write_str(scheme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SignatureAlgorithm {
        s.parse().unwrap()
    }

    #[test]
    fn parses_x509_and_jca_names() {
        assert_eq!(parse("sha256WithRSAEncryption"), SignatureAlgorithm::new(RsaPkcs1v15, Some(Sha256)));
        assert_eq!(parse("SHA1withRSA"), SignatureAlgorithm::new(RsaPkcs1v15, Some(Sha1)));
        assert_eq!(parse("SHA256withRSA/PSS"), SignatureAlgorithm::new(RsaPss, Some(Sha256)));
        assert_eq!(parse("ecdsa-with-SHA384"), SignatureAlgorithm::new(Ecdsa, Some(Sha384)));
        assert_eq!(parse("SHA512withECDSA"), SignatureAlgorithm::new(Ecdsa, Some(Sha512)));
    }

    #[test]
    fn parses_bare_and_jose_names() {
        assert_eq!(parse("RSA"), SignatureAlgorithm::new(RsaPkcs1v15, None));
        assert_eq!(parse("rsassaPss"), SignatureAlgorithm::new(RsaPss, None));
        assert_eq!(parse("ECDSA"), SignatureAlgorithm::new(Ecdsa, None));
        assert_eq!(parse("PS384"), SignatureAlgorithm::new(RsaPss, Some(Sha384)));
        assert_eq!(parse("ES256"), SignatureAlgorithm::new(Ecdsa, Some(Sha256)));
    }

    #[test]
    fn parses_oids() {
        assert_eq!(parse("1.2.840.113549.1.1.11"), SignatureAlgorithm::new(RsaPkcs1v15, Some(Sha256)));
        assert_eq!(parse("1.2.840.10045.4.3.2"), SignatureAlgorithm::new(Ecdsa, Some(Sha256)));
        assert_eq!(parse("1.2.840.113549.1.1.10"), SignatureAlgorithm::new(RsaPss, None));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        for s in ["md5WithRSAEncryption", "DSA", "ES999", "1.2.3.4", "", "sha256With"] {
            assert!(s.parse::<SignatureAlgorithm>().is_err(), "{s}");
        }
    }
}
