use std::fs;

use bancoposta_ingest::{IngestError, ReaderOptions, StatementKind, read_statement};
use rust_decimal::Decimal;

const EXPORT: &str = "\
Data,Valuta,Addebiti,Accrediti,Descrizione operazioni
01/08/18,,,,SALDO INIZIALE
01/08/18,01/08/18,200.00,,VOSTRA DISPOS. DI BONIFICO TRN AAAAAAAA BENEF Lorenzo Giudici PER Buon compleanno!
02/08/18,02/08/18,,200.00,BONIFICO A VOSTRO FAVORE TRN BBBBBBBB DA Lorenzo Giudici PER Tanti Auguri!
";

#[test]
fn test_reads_csv_detected_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bonifico.csv");
    fs::write(&path, EXPORT).unwrap();

    let txns = read_statement(&path, None, &ReaderOptions::default()).unwrap();
    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0].amount, Decimal::new(-20000, 2));
    assert_eq!(txns[1].amount, Decimal::new(20000, 2));
}

#[test]
fn test_explicit_kind_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.dat");
    fs::write(&path, EXPORT).unwrap();

    let err = read_statement(&path, None, &ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedKind(_)));

    let txns = read_statement(&path, Some(StatementKind::Csv), &ReaderOptions::default()).unwrap();
    assert_eq!(txns.len(), 2);
}

#[test]
fn test_custom_currency_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bonifico.csv");
    fs::write(&path, EXPORT).unwrap();

    let opts = ReaderOptions {
        currency: "CHF".to_string(),
        ..ReaderOptions::default()
    };
    let txns = read_statement(&path, None, &opts).unwrap();
    assert!(txns.iter().all(|t| t.currency == "CHF"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_statement(dir.path().join("nope.csv"), None, &ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}

#[test]
fn test_broken_pdf_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("estratto.pdf");
    fs::write(&path, b"not a pdf").unwrap();

    let err = read_statement(&path, None, &ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Pdf { .. }));
}
