// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Document-signer public keys.

use std::fmt;
use std::str::FromStr;

use epassport_common::ObjectIdentifier;
use serde::Serialize;

use crate::signature_algorithm::SignatureFamily;

/// A document-signer public key.
///
/// Exactly one shape is present by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa {
        /// Big-endian modulus.
        modulus: Vec<u8>,
        /// Big-endian public exponent; 65537 (or the configured default) when absent.
        exponent: Option<Vec<u8>>,
    },
    Ec {
        /// Curve name or dotted OID, resolved at verification time.
        curve_name: String,
        /// SEC1 point, or the bare `x || y` coordinates.
        public_key_q: Vec<u8>,
    },
}

impl PublicKey {
    pub fn rsa(modulus: impl Into<Vec<u8>>) -> Self {
        PublicKey::Rsa {
            modulus: modulus.into(),
            exponent: None,
        }
    }

    pub fn rsa_with_exponent(modulus: impl Into<Vec<u8>>, exponent: impl Into<Vec<u8>>) -> Self {
        PublicKey::Rsa {
            modulus: modulus.into(),
            exponent: Some(exponent.into()),
        }
    }

    pub fn ec(curve_name: impl Into<String>, public_key_q: impl Into<Vec<u8>>) -> Self {
        PublicKey::Ec {
            curve_name: curve_name.into(),
            public_key_q: public_key_q.into(),
        }
    }

    pub fn family(&self) -> SignatureFamily {
        match self {
            PublicKey::Rsa { .. } => SignatureFamily::Rsa,
            PublicKey::Ec { .. } => SignatureFamily::Ec,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum NamedCurve {
    P256,
    P384,
    P521,
}

impl NamedCurve {
    pub fn oid(self) -> &'static [u64] {
        match self {
            NamedCurve::P256 => &[1, 2, 840, 10045, 3, 1, 7],
            NamedCurve::P384 => &[1, 3, 132, 0, 34],
            NamedCurve::P521 => &[1, 3, 132, 0, 35],
        }
    }

    /// Length of one field element in bytes.
    pub fn field_len(self) -> usize {
        match self {
            NamedCurve::P256 => 32,
            NamedCurve::P384 => 48,
            NamedCurve::P521 => 66,
        }
    }

    /// Normalize `public_key_q` to SEC1 encoding.
    ///
    /// Bare `x || y` coordinates get the uncompressed-point prefix; anything
    /// else is passed through for the curve implementation to judge.
    pub fn sec1_point(self, public_key_q: &[u8]) -> Vec<u8> {
        if public_key_q.len() == 2 * self.field_len() {
            let mut point = Vec::with_capacity(public_key_q.len() + 1);
            point.push(0x04);
            point.extend_from_slice(public_key_q);
            point
        } else {
            public_key_q.to_vec()
        }
    }
}

impl fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NamedCurve::P256 => "P-256",
            NamedCurve::P384 => "P-384",
            NamedCurve::P521 => "P-521",
        })
    }
}

impl FromStr for NamedCurve {
    type Err = String;

    /// Accepts NIST, SEC and X9.62 names and the dotted curve OID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let curves = [NamedCurve::P256, NamedCurve::P384, NamedCurve::P521];
        if let Ok(oid) = s.trim().parse::<ObjectIdentifier>() {
            return curves
                .into_iter()
                .find(|c| oid.is(c.oid()))
                .ok_or_else(|| format!("unsupported curve OID {oid}"));
        }

        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "p256" | "secp256r1" | "prime256v1" | "nistp256" => Ok(NamedCurve::P256),
            "p384" | "secp384r1" | "nistp384" => Ok(NamedCurve::P384),
            "p521" | "secp521r1" | "nistp521" => Ok(NamedCurve::P521),
            _ => Err(format!("unsupported curve `{s}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_aliases() {
        for name in ["P-256", "secp256r1", "prime256v1", "nistP256", "1.2.840.10045.3.1.7"] {
            assert_eq!(name.parse::<NamedCurve>().unwrap(), NamedCurve::P256, "{name}");
        }
        assert_eq!("secp384r1".parse::<NamedCurve>().unwrap(), NamedCurve::P384);
        assert_eq!("1.3.132.0.35".parse::<NamedCurve>().unwrap(), NamedCurve::P521);
        assert!("brainpoolP256r1".parse::<NamedCurve>().is_err());
        assert!("1.3.36.3.3.2.8.1.1.7".parse::<NamedCurve>().is_err());
    }

    #[test]
    fn bare_coordinates_get_uncompressed_prefix() {
        let xy = [7u8; 64];
        let point = NamedCurve::P256.sec1_point(&xy);
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);

        let sec1 = [0x04; 65];
        assert_eq!(NamedCurve::P256.sec1_point(&sec1), sec1.to_vec());
    }
}
