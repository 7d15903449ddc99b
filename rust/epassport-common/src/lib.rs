// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoding building blocks for ePassport passive authentication.
//!
//! Everything here is pure: bytes or text in, structured values or a typed
//! error out. Validators that turn these into authenticity findings live in
//! `epassport-validation`.

pub mod der_reader;
pub mod hash_algorithm;
pub mod lds_security_object;
pub mod mrz;
pub mod oid;

pub use der_reader::{DecodeError, DerReader, Element};
pub use hash_algorithm::HashAlgorithm;
pub use lds_security_object::{
    decode_lds_security_object, decode_signed_content, AlgorithmIdentifier, ContentFraming, DataGroupHash,
    DecodedContent, LdsVersionInfo, MAX_DATA_GROUP_NUMBER,
};
pub use mrz::{compute_check_digit, parse_mrz, CheckDigit, MrzData, MrzError, MrzField, MrzFormat, Sex};
pub use oid::ObjectIdentifier;
