// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded DER reader.
//!
//! A [`DerReader`] walks a byte slice with an explicit offset and end bound.
//! Reading an element yields a child reader bounded by the element's declared
//! length, so no grammar rule can read past its enclosing element.
//!
//! Overruns are classified by where they land:
//! - past the end of the input buffer: [`DecodeError::TruncatedContent`]
//! - inside the buffer but past the enclosing element: [`DecodeError::LengthOverflow`]
//!
//! A required element absent from a complete enclosing element is
//! [`DecodeError::InvalidValue`], as are non-minimal long-form lengths.
//!
//! Only single-octet identifiers are accepted; the high-tag-number form is
//! rejected as an unexpected tag.

use thiserror::Error;

use crate::oid::ObjectIdentifier;

pub mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const CONTEXT_0: u8 = 0xa0;

    pub fn name(tag: u8) -> &'static str {
        match tag {
            INTEGER => "INTEGER",
            OCTET_STRING => "OCTET STRING",
            NULL => "NULL",
            OBJECT_IDENTIFIER => "OBJECT IDENTIFIER",
            PRINTABLE_STRING => "PrintableString",
            SEQUENCE => "SEQUENCE",
            SET => "SET",
            CONTEXT_0 => "[0]",
            _ => "other",
        }
    }
}

/// Longest long-form length accepted, in octets.
const MAX_LENGTH_OCTETS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated content: {context} needs {needed} bytes at offset {offset}, only {available} remain")]
    TruncatedContent {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unexpected tag at offset {offset}: expected {expected}, found 0x{found:02x}")]
    UnexpectedTag {
        offset: usize,
        expected: &'static str,
        found: u8,
    },

    #[error("length overflow at offset {offset}: {reason}")]
    LengthOverflow { offset: usize, reason: String },

    #[error("{count} trailing bytes after {context} at offset {offset}")]
    TrailingBytes {
        context: &'static str,
        offset: usize,
        count: usize,
    },

    #[error("invalid {context} at offset {offset}: {reason}")]
    InvalidValue {
        context: &'static str,
        offset: usize,
        reason: String,
    },

    #[error("unexpected content type {found} (expected {expected})")]
    UnexpectedContentType { expected: String, found: String },
}

/// One decoded TLV element.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub tag: u8,
    /// Offset of the identifier octet within the input.
    pub offset: usize,
    /// Full TLV encoding.
    pub raw: &'a [u8],
    /// Reader over the content octets.
    pub content: DerReader<'a>,
}

#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    input: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            end: input.len(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// Content bytes not yet consumed.
    pub fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..self.end]
    }

    pub fn peek_tag(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.input[self.pos])
        }
    }

    fn overrun(&self, at: usize, needed: usize, context: &'static str) -> DecodeError {
        let in_input = self.input.len().saturating_sub(at);
        if needed > in_input {
            DecodeError::TruncatedContent {
                context,
                offset: at,
                needed,
                available: in_input,
            }
        } else {
            DecodeError::LengthOverflow {
                offset: at,
                reason: format!(
                    "{context} of {needed} bytes exceeds the {} bytes left in the enclosing element",
                    self.end.saturating_sub(at)
                ),
            }
        }
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(self.overrun(self.pos, n, context));
        }
        let out = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_length(&mut self) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let first = self.take(1, "length")?[0];
        if first & 0x80 == 0 {
            return Ok(usize::from(first));
        }

        let count = usize::from(first & 0x7f);
        if count == 0 {
            return Err(DecodeError::LengthOverflow {
                offset,
                reason: "indefinite length is not allowed in DER".to_string(),
            });
        }
        if count > MAX_LENGTH_OCTETS {
            return Err(DecodeError::LengthOverflow {
                offset,
                reason: format!("length uses {count} octets (at most {MAX_LENGTH_OCTETS} supported)"),
            });
        }

        let bytes = self.take(count, "long-form length")?;
        let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        if bytes[0] == 0 || len < 0x80 {
            return Err(DecodeError::InvalidValue {
                context: "length",
                offset,
                reason: format!("length {len} is not minimally encoded"),
            });
        }
        Ok(len)
    }

    /// Read the next TLV element of any tag.
    pub fn read_element(&mut self) -> Result<Element<'a>, DecodeError> {
        let offset = self.pos;
        let tag = self.take(1, "tag")?[0];
        if tag & 0x1f == 0x1f {
            return Err(DecodeError::UnexpectedTag {
                offset,
                expected: "single-octet tag",
                found: tag,
            });
        }

        let len = self.read_length()?;
        let start = self.pos;
        if len > self.remaining() {
            return Err(self.overrun(start, len, tag::name(tag)));
        }
        self.pos += len;

        Ok(Element {
            tag,
            offset,
            raw: &self.input[offset..self.pos],
            content: DerReader {
                input: self.input,
                pos: start,
                end: start + len,
            },
        })
    }

    /// Read the next element and require its tag.
    pub fn read_expected(&mut self, expected: u8) -> Result<DerReader<'a>, DecodeError> {
        match self.peek_tag() {
            Some(found) if found != expected => {
                return Err(DecodeError::UnexpectedTag {
                    offset: self.pos,
                    expected: tag::name(expected),
                    found,
                })
            }
            None if !self.input.is_empty() => {
                return Err(DecodeError::InvalidValue {
                    context: tag::name(expected),
                    offset: self.pos,
                    reason: "required element missing".to_string(),
                })
            }
            _ => {}
        }
        Ok(self.read_element()?.content)
    }

    pub fn read_sequence(&mut self) -> Result<DerReader<'a>, DecodeError> {
        self.read_expected(tag::SEQUENCE)
    }

    /// Read a non-negative INTEGER that fits in 64 bits.
    pub fn read_unsigned(&mut self) -> Result<u64, DecodeError> {
        let offset = self.pos;
        let content = self.read_expected(tag::INTEGER)?.rest();
        let invalid = |reason: &str| DecodeError::InvalidValue {
            context: "INTEGER",
            offset,
            reason: reason.to_string(),
        };

        match content {
            [] => return Err(invalid("empty encoding")),
            [first, ..] if first & 0x80 != 0 => return Err(invalid("negative value")),
            [0, second, ..] if second & 0x80 == 0 => return Err(invalid("non-minimal encoding")),
            _ => {}
        }

        let significant = if content[0] == 0 { &content[1..] } else { content };
        if significant.len() > 8 {
            return Err(invalid("value does not fit in 64 bits"));
        }
        Ok(significant.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8], DecodeError> {
        Ok(self.read_expected(tag::OCTET_STRING)?.rest())
    }

    pub fn read_oid(&mut self) -> Result<ObjectIdentifier, DecodeError> {
        let offset = self.pos;
        let content = self.read_expected(tag::OBJECT_IDENTIFIER)?.rest();
        ObjectIdentifier::from_der_content(content).map_err(|reason| DecodeError::InvalidValue {
            context: "OBJECT IDENTIFIER",
            offset,
            reason,
        })
    }

    pub fn read_printable_string(&mut self) -> Result<&'a str, DecodeError> {
        let offset = self.pos;
        let content = self.read_expected(tag::PRINTABLE_STRING)?.rest();
        if let Some(bad) = content.iter().find(|&&b| !is_printable(b)) {
            return Err(DecodeError::InvalidValue {
                context: "PrintableString",
                offset,
                reason: format!("character 0x{bad:02x} is not printable"),
            });
        }
        // PrintableString is a subset of ASCII.
        std::str::from_utf8(content).map_err(|e| DecodeError::InvalidValue {
            context: "PrintableString",
            offset,
            reason: e.to_string(),
        })
    }

    /// Require that every content byte was consumed.
    pub fn finish(&self, context: &'static str) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes {
                context,
                offset: self.pos,
                count: self.remaining(),
            })
        }
    }
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&b)
}
