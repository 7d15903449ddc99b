// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use epassport_common::{compute_check_digit, parse_mrz, MrzError, MrzField, MrzFormat, Sex};
use epassport_test_utils::mrz::{td3, SPECIMEN_TD1, SPECIMEN_TD2, SPECIMEN_TD3};

#[test]
fn check_digit_examples() {
    assert_eq!(compute_check_digit("L898902C3").unwrap(), 6);
    assert_eq!(compute_check_digit("740812").unwrap(), 2);
    assert_eq!(compute_check_digit("120415").unwrap(), 9);
    assert_eq!(compute_check_digit("<<<<<<").unwrap(), 0);
    assert!(matches!(
        compute_check_digit("ab"),
        Err(MrzError::InvalidCharacter { ch: 'a', .. })
    ));
}

#[test]
fn parses_td3_specimen() {
    let mrz = parse_mrz(SPECIMEN_TD3).unwrap();

    assert_eq!(mrz.format, MrzFormat::Td3);
    assert_eq!(mrz.document_type, "P");
    assert_eq!(mrz.issuing_state, "UTO");
    assert_eq!(mrz.primary_identifier, "ERIKSSON");
    assert_eq!(mrz.secondary_identifier, "ANNA MARIA");
    assert_eq!(mrz.document_number, "L898902C3");
    assert_eq!(mrz.nationality, "UTO");
    assert_eq!(mrz.birth_date, "740812");
    assert_eq!(mrz.sex, Sex::Female);
    assert_eq!(mrz.expiry_date, "120415");
    assert_eq!(mrz.optional_data, "ZE184226B");
    assert_eq!(mrz.optional_data_2, None);
    assert_eq!(mrz.check_digits.len(), 5);
    assert!(mrz.all_check_digits_valid());
    assert!(mrz.composite_valid());
}

#[test]
fn parses_td2_specimen() {
    let mrz = parse_mrz(SPECIMEN_TD2).unwrap();
    assert_eq!(mrz.format, MrzFormat::Td2);
    assert_eq!(mrz.document_type, "I");
    assert_eq!(mrz.document_number, "D23145890");
    assert_eq!(mrz.optional_data, "");
    assert!(mrz.check_digit(MrzField::OptionalData).is_none());
    assert!(mrz.all_check_digits_valid());
}

#[test]
fn parses_td1_specimen() {
    let mrz = parse_mrz(SPECIMEN_TD1).unwrap();
    assert_eq!(mrz.format, MrzFormat::Td1);
    assert_eq!(mrz.document_number, "D23145890");
    assert_eq!(mrz.birth_date, "740812");
    assert_eq!(mrz.expiry_date, "120415");
    assert_eq!(mrz.nationality, "UTO");
    assert_eq!(mrz.primary_identifier, "ERIKSSON");
    assert_eq!(mrz.secondary_identifier, "ANNA MARIA");
    assert_eq!(mrz.optional_data_2.as_deref(), Some(""));
    assert!(mrz.all_check_digits_valid());
}

#[test]
fn td1_long_document_number_continues_into_optional_data() {
    let mrz = parse_mrz("I<UTOD23145890<AB0<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<8\nERIKSSON<<ANNA<MARIA<<<<<<<<<<")
        .unwrap();
    assert_eq!(mrz.document_number, "D23145890AB");
    assert_eq!(mrz.optional_data, "");
    let number = mrz.check_digit(MrzField::DocumentNumber).unwrap();
    assert_eq!(number.declared, '0');
    assert!(number.valid);
    assert!(mrz.all_check_digits_valid());
}

#[test]
fn recomputing_check_digits_reproduces_declared_digits() {
    for text in [SPECIMEN_TD1, SPECIMEN_TD2, SPECIMEN_TD3] {
        let mrz = parse_mrz(text).unwrap();
        for check in &mrz.check_digits {
            let recomputed = compute_check_digit(&check.data).unwrap();
            assert_eq!(recomputed, check.computed);
            assert_eq!(Some(u32::from(recomputed)), check.declared.to_digit(10), "{:?}", check.field);
        }
    }
}

#[test]
fn corrupted_document_number_fails_its_digit_and_composite() {
    let tampered = SPECIMEN_TD3.replace("L898902C3", "L898902C4");
    let mrz = parse_mrz(&tampered).unwrap();

    assert!(!mrz.check_digit(MrzField::DocumentNumber).unwrap().valid);
    assert!(!mrz.composite_valid());
    assert!(mrz.check_digit(MrzField::BirthDate).unwrap().valid);
    assert!(mrz.check_digit(MrzField::ExpiryDate).unwrap().valid);
    assert!(!mrz.all_check_digits_valid());
}

#[test]
fn empty_optional_data_may_use_filler_digit() {
    let text = td3("DOE<<JOHN", "X1234567", "900101", 'M', "300101", "");
    let mrz = parse_mrz(&text).unwrap();
    let optional = mrz.check_digit(MrzField::OptionalData).unwrap();
    assert_eq!(optional.declared, '<');
    assert!(optional.valid);
    assert_eq!(mrz.document_number, "X1234567");
    assert_eq!(mrz.sex, Sex::Male);
    assert!(mrz.all_check_digits_valid());
}

#[test]
fn concatenated_and_crlf_forms_parse_identically() {
    let expected = parse_mrz(SPECIMEN_TD3).unwrap();
    assert_eq!(parse_mrz(&SPECIMEN_TD3.replace('\n', "")).unwrap(), expected);
    assert_eq!(parse_mrz(&SPECIMEN_TD3.replace('\n', "\r\n")).unwrap(), expected);
}

#[test]
fn unspecified_sex_accepts_filler_and_x() {
    let filler = td3("DOE<<JOHN", "X1234567", "900101", '<', "300101", "");
    let x = td3("DOE<<JOHN", "X1234567", "900101", 'X', "300101", "");
    assert_eq!(parse_mrz(&filler).unwrap().sex, Sex::Unspecified);
    assert_eq!(parse_mrz(&x).unwrap().sex, Sex::Unspecified);
}

#[test]
fn structural_problems_are_errors() {
    let short = SPECIMEN_TD3.replacen('<', "", 1);
    assert!(matches!(parse_mrz(&short), Err(MrzError::UnrecognizedLayout { lines: 2, .. })));

    let one_line = SPECIMEN_TD3.lines().next().unwrap();
    assert!(matches!(parse_mrz(one_line), Err(MrzError::UnrecognizedLayout { lines: 1, .. })));

    assert!(matches!(parse_mrz(""), Err(MrzError::UnrecognizedLayout { lines: 0, .. })));

    let lowercase = SPECIMEN_TD3.replace("ERIKSSON", "eriksson");
    assert!(matches!(
        parse_mrz(&lowercase),
        Err(MrzError::InvalidCharacter { ch: 'e', line: 1, column: 5 })
    ));

    let bad_sex = SPECIMEN_TD3.replace("7408122F", "7408122Q");
    assert!(matches!(parse_mrz(&bad_sex), Err(MrzError::InvalidField { field: "sex", .. })));
}
