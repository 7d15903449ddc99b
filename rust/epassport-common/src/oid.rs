// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ASN.1 object identifiers.

use std::fmt;
use std::str::FromStr;

/// `id-icao-mrtd-security-ldsSecurityObject`.
pub const ID_LDS_SECURITY_OBJECT: &[u64] = &[2, 23, 136, 1, 1, 1];

pub const ID_SHA1: &[u64] = &[1, 3, 14, 3, 2, 26];
pub const ID_SHA224: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 4];
pub const ID_SHA256: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
pub const ID_SHA384: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 2];
pub const ID_SHA512: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 3];

/// A decoded object identifier, held as its arcs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier(Vec<u64>);

impl ObjectIdentifier {
    pub fn new(arcs: impl Into<Vec<u64>>) -> Self {
        Self(arcs.into())
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    pub fn is(&self, arcs: &[u64]) -> bool {
        self.0 == arcs
    }

    /// Decode the content octets of a DER OBJECT IDENTIFIER.
    pub(crate) fn from_der_content(content: &[u8]) -> Result<Self, String> {
        if content.is_empty() {
            return Err("empty object identifier".to_string());
        }

        let mut arcs = Vec::new();
        let mut value: u64 = 0;
        let mut in_arc = false;

        for &b in content {
            if !in_arc && b == 0x80 {
                return Err("non-minimal object identifier arc".to_string());
            }
            value = value
                .checked_mul(128)
                .and_then(|v| v.checked_add(u64::from(b & 0x7f)))
                .ok_or_else(|| "object identifier arc does not fit in 64 bits".to_string())?;

            if b & 0x80 != 0 {
                in_arc = true;
                continue;
            }

            if arcs.is_empty() {
                // The first subidentifier packs the first two arcs.
                let (first, second) = match value {
                    0..=39 => (0, value),
                    40..=79 => (1, value - 40),
                    _ => (2, value - 80),
                };
                arcs.push(first);
                arcs.push(second);
            } else {
                arcs.push(value);
            }
            value = 0;
            in_arc = false;
        }

        if in_arc {
            return Err("object identifier ends inside an arc".to_string());
        }

        Ok(Self(arcs))
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|e| format!("bad object identifier arc `{part}`: {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        if arcs.len() < 2 {
            return Err(format!("object identifier `{s}` needs at least two arcs"));
        }
        Ok(Self(arcs))
    }
}
