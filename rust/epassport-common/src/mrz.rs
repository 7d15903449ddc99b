// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Machine-readable zone parsing (ICAO 9303-3/4/5/6).
//!
//! Supported layouts:
//! - TD1: three lines of 30 characters (ID cards)
//! - TD2: two lines of 36 characters
//! - TD3: two lines of 44 characters (passport booklets)
//!
//! Lines may be separated by newlines or concatenated. Structural problems
//! are errors; check-digit mismatches are recorded on the parsed value.

use serde::Serialize;
use thiserror::Error;

const WEIGHTS: [u32; 3] = [7, 3, 1];
const FILLER: char = '<';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MrzError {
    #[error("unrecognized MRZ layout: {lines} line(s) of lengths {lengths:?}")]
    UnrecognizedLayout { lines: usize, lengths: Vec<usize> },

    #[error("invalid MRZ character {ch:?} on line {line}, column {column}")]
    InvalidCharacter { ch: char, line: usize, column: usize },

    #[error("invalid MRZ field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Character value for check-digit computation.
fn char_value(ch: char) -> Option<u32> {
    match ch {
        '0'..='9' => ch.to_digit(10),
        'A'..='Z' => Some(u32::from(ch) - u32::from('A') + 10),
        FILLER => Some(0),
        _ => None,
    }
}

/// Compute the weighted modulo-10 check digit (weights 7, 3, 1).
pub fn compute_check_digit(data: &str) -> Result<u8, MrzError> {
    let mut total = 0u32;
    for (i, ch) in data.chars().enumerate() {
        let value = char_value(ch).ok_or(MrzError::InvalidCharacter {
            ch,
            line: 0,
            column: i,
        })?;
        total += value * WEIGHTS[i % 3];
    }
    // `total % 10` is a single decimal digit.
    Ok((total % 10) as u8)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MrzFormat {
    Td1,
    Td2,
    Td3,
}

impl MrzFormat {
    pub const fn line_len(self) -> usize {
        match self {
            MrzFormat::Td1 => 30,
            MrzFormat::Td2 => 36,
            MrzFormat::Td3 => 44,
        }
    }

    pub const fn line_count(self) -> usize {
        match self {
            MrzFormat::Td1 => 3,
            MrzFormat::Td2 | MrzFormat::Td3 => 2,
        }
    }

    fn detect(line_count: usize, line_len: usize) -> Option<Self> {
        [MrzFormat::Td1, MrzFormat::Td2, MrzFormat::Td3]
            .into_iter()
            .find(|f| f.line_count() == line_count && f.line_len() == line_len)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MrzField {
    DocumentNumber,
    BirthDate,
    ExpiryDate,
    OptionalData,
    Composite,
}

impl MrzField {
    pub fn name(self) -> &'static str {
        match self {
            MrzField::DocumentNumber => "document_number",
            MrzField::BirthDate => "birth_date",
            MrzField::ExpiryDate => "expiry_date",
            MrzField::OptionalData => "optional_data",
            MrzField::Composite => "composite",
        }
    }
}

/// One check digit as printed, alongside the value recomputed from its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckDigit {
    pub field: MrzField,
    /// Characters the digit covers, fillers included.
    pub data: String,
    pub declared: char,
    pub computed: u8,
    pub valid: bool,
}

impl CheckDigit {
    fn new(field: MrzField, data: String, declared: char, filler_allowed: bool) -> Result<Self, MrzError> {
        let computed = compute_check_digit(&data)?;
        let matches = declared.to_digit(10) == Some(u32::from(computed));
        // An unused optional-data field may carry a filler instead of a digit.
        let filler_ok = filler_allowed && declared == FILLER && data.chars().all(|c| c == FILLER);
        Ok(Self {
            field,
            data,
            declared,
            computed,
            valid: matches || filler_ok,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unspecified,
}

/// Fields decoded from an MRZ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MrzData {
    pub format: MrzFormat,
    pub document_type: String,
    pub issuing_state: String,
    pub primary_identifier: String,
    pub secondary_identifier: String,
    pub document_number: String,
    pub nationality: String,
    /// `YYMMDD`, unknown parts as fillers.
    pub birth_date: String,
    pub sex: Sex,
    /// `YYMMDD`.
    pub expiry_date: String,
    pub optional_data: String,
    /// Second optional-data field (TD1 only).
    pub optional_data_2: Option<String>,
    pub check_digits: Vec<CheckDigit>,
}

impl MrzData {
    pub fn check_digit(&self, field: MrzField) -> Option<&CheckDigit> {
        self.check_digits.iter().find(|c| c.field == field)
    }

    pub fn all_check_digits_valid(&self) -> bool {
        self.check_digits.iter().all(|c| c.valid)
    }

    pub fn composite_valid(&self) -> bool {
        self.check_digit(MrzField::Composite).is_some_and(|c| c.valid)
    }
}

/// Split an MRZ into its lines and validate layout and character set.
fn split_lines(mrz: &str) -> Result<(MrzFormat, Vec<&str>), MrzError> {
    let lines: Vec<&str> = mrz
        .lines()
        .map(|l| l.trim_end_matches('\r').trim())
        .filter(|l| !l.is_empty())
        .collect();

    // Concatenated lines: split by the total length of a known layout.
    let lines = if lines.len() == 1 {
        let single = lines[0];
        let format = [MrzFormat::Td1, MrzFormat::Td2, MrzFormat::Td3]
            .into_iter()
            .find(|f| single.is_ascii() && f.line_len() * f.line_count() == single.len())
            .ok_or_else(|| MrzError::UnrecognizedLayout {
                lines: 1,
                lengths: vec![single.chars().count()],
            })?;
        (0..format.line_count())
            .map(|i| &single[i * format.line_len()..(i + 1) * format.line_len()])
            .collect()
    } else {
        lines
    };

    let lengths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
    let format = match lengths.first() {
        Some(&len) if lengths.iter().all(|&l| l == len) => MrzFormat::detect(lines.len(), len),
        _ => None,
    }
    .ok_or_else(|| MrzError::UnrecognizedLayout {
        lines: lines.len(),
        lengths: lengths.clone(),
    })?;

    for (line_no, line) in lines.iter().enumerate() {
        if let Some((column, ch)) = line
            .chars()
            .enumerate()
            .find(|(_, c)| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == FILLER))
        {
            return Err(MrzError::InvalidCharacter {
                ch,
                line: line_no + 1,
                column,
            });
        }
    }

    Ok((format, lines))
}

/// Parse an MRZ and recompute its check digits.
pub fn parse_mrz(mrz: &str) -> Result<MrzData, MrzError> {
    let (format, lines) = split_lines(mrz)?;
    match format {
        MrzFormat::Td1 => parse_td1(lines[0], lines[1], lines[2]),
        MrzFormat::Td2 => parse_td2_td3(MrzFormat::Td2, lines[0], lines[1]),
        MrzFormat::Td3 => parse_td2_td3(MrzFormat::Td3, lines[0], lines[1]),
    }
}

fn char_at(line: &str, i: usize) -> char {
    // Lines are ASCII after `split_lines`.
    line.as_bytes()[i] as char
}

fn trim_filler(s: &str) -> String {
    s.trim_end_matches(FILLER).to_string()
}

fn parse_sex(ch: char) -> Result<Sex, MrzError> {
    match ch {
        'M' => Ok(Sex::Male),
        'F' => Ok(Sex::Female),
        '<' | 'X' => Ok(Sex::Unspecified),
        other => Err(MrzError::InvalidField {
            field: "sex",
            reason: format!("unexpected value {other:?}"),
        }),
    }
}

/// Split `PRIMARY<<SECONDARY<NAMES` into its two identifiers.
fn parse_name(field: &str) -> (String, String) {
    let readable = |s: &str| {
        s.split(FILLER)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };
    match field.split_once("<<") {
        Some((primary, secondary)) => (readable(primary), readable(secondary)),
        None => (readable(field), String::new()),
    }
}

fn parse_td2_td3(format: MrzFormat, line1: &str, line2: &str) -> Result<MrzData, MrzError> {
    let len = format.line_len();
    let (primary_identifier, secondary_identifier) = parse_name(&line1[5..]);

    let mut check_digits = vec![
        CheckDigit::new(MrzField::DocumentNumber, line2[0..9].to_string(), char_at(line2, 9), false)?,
        CheckDigit::new(MrzField::BirthDate, line2[13..19].to_string(), char_at(line2, 19), false)?,
        CheckDigit::new(MrzField::ExpiryDate, line2[21..27].to_string(), char_at(line2, 27), false)?,
    ];

    let optional_end = if format == MrzFormat::Td3 { 42 } else { len - 1 };
    if format == MrzFormat::Td3 {
        check_digits.push(CheckDigit::new(
            MrzField::OptionalData,
            line2[28..42].to_string(),
            char_at(line2, 42),
            true,
        )?);
    }

    let composite = format!("{}{}{}", &line2[0..10], &line2[13..20], &line2[21..len - 1]);
    check_digits.push(CheckDigit::new(MrzField::Composite, composite, char_at(line2, len - 1), false)?);

    Ok(MrzData {
        format,
        document_type: trim_filler(&line1[0..2]),
        issuing_state: trim_filler(&line1[2..5]),
        primary_identifier,
        secondary_identifier,
        document_number: trim_filler(&line2[0..9]),
        nationality: trim_filler(&line2[10..13]),
        birth_date: line2[13..19].to_string(),
        sex: parse_sex(char_at(line2, 20))?,
        expiry_date: line2[21..27].to_string(),
        optional_data: trim_filler(&line2[28..optional_end]),
        optional_data_2: None,
        check_digits,
    })
}

fn parse_td1(line1: &str, line2: &str, line3: &str) -> Result<MrzData, MrzError> {
    let (primary_identifier, secondary_identifier) = parse_name(line3);

    // Document numbers longer than nine characters continue into the optional
    // data; the check-digit position then holds a filler and the last character
    // of the continuation is the check digit.
    let (document_number, number_check, optional_data) = if char_at(line1, 14) == FILLER {
        let extension = line1[15..30].trim_end_matches(FILLER);
        match extension.len() {
            0 => (line1[5..14].to_string(), FILLER, String::new()),
            n => (
                format!("{}{}", &line1[5..14], &extension[..n - 1]),
                char_at(extension, n - 1),
                String::new(),
            ),
        }
    } else {
        (line1[5..14].to_string(), char_at(line1, 14), trim_filler(&line1[15..30]))
    };

    let composite = format!("{}{}{}{}", &line1[5..30], &line2[0..7], &line2[8..15], &line2[18..29]);
    let check_digits = vec![
        CheckDigit::new(MrzField::DocumentNumber, document_number.clone(), number_check, false)?,
        CheckDigit::new(MrzField::BirthDate, line2[0..6].to_string(), char_at(line2, 6), false)?,
        CheckDigit::new(MrzField::ExpiryDate, line2[8..14].to_string(), char_at(line2, 14), false)?,
        CheckDigit::new(MrzField::Composite, composite, char_at(line2, 29), false)?,
    ];

    Ok(MrzData {
        format: MrzFormat::Td1,
        document_type: trim_filler(&line1[0..2]),
        issuing_state: trim_filler(&line1[2..5]),
        primary_identifier,
        secondary_identifier,
        document_number: trim_filler(&document_number),
        nationality: trim_filler(&line2[15..18]),
        birth_date: line2[0..6].to_string(),
        sex: parse_sex(char_at(line2, 7))?,
        expiry_date: line2[8..14].to_string(),
        optional_data,
        optional_data_2: Some(trim_filler(&line2[18..29])),
        check_digits,
    })
}
