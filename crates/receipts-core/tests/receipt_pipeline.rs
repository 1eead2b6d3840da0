use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use receipts_core::{
    records_from_json, records_to_json, BareIntegerPolicy, ProductPrice, ReceiptError,
    ReceiptParser, ReceiptsConfig, RecordedDetections,
};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn expected_records() -> Vec<ProductPrice> {
    let json = fs::read_to_string(data_dir().join("expected-output-test-receipt.json")).unwrap();
    records_from_json(&json).unwrap()
}

/// Copy the recorded OCR output next to a placeholder image in a temp dir.
fn staged_receipt() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("test-receipt.jpg");
    fs::write(&image, b"placeholder image bytes").unwrap();
    fs::copy(
        data_dir().join("test-receipt.ocr.json"),
        dir.path().join("test-receipt.ocr.json"),
    )
    .unwrap();
    (dir, image)
}

#[test]
fn test_process_receipt_success() {
    let (_dir, image) = staged_receipt();
    let parser = ReceiptParser::new(RecordedDetections::sidecar());

    let actual = parser.process_receipt(&image).unwrap();
    let expected = expected_records();

    assert_eq!(actual.len(), expected.len());
    for (i, (expected, actual)) in expected.iter().zip(&actual).enumerate() {
        assert_eq!(actual, expected, "difference at index {}", i);
    }
}

#[test]
fn test_line_statistics() {
    let (_dir, image) = staged_receipt();
    let parser = ReceiptParser::new(RecordedDetections::sidecar());

    let result = parser.parse_receipt(&image).unwrap();
    assert_eq!(result.line_count, 13);
    // Header, date/time and the closing greeting.
    assert_eq!(result.lines_without_price, 3);
}

#[test]
fn test_output_serializes_as_pairs() {
    let (_dir, image) = staged_receipt();
    let records = ReceiptParser::new(RecordedDetections::sidecar())
        .process_receipt(&image)
        .unwrap();

    let json = records_to_json(&records).unwrap();
    assert!(json.starts_with(r#"[["Store","0427"],["MILK 1L","2.49"]"#), "{}", json);
    assert_eq!(records_from_json(&json).unwrap(), records);
}

#[test]
fn test_config_without_bare_integers() {
    let (dir, image) = staged_receipt();
    let config_path = dir.path().join("receipts.json");
    fs::write(
        &config_path,
        r#"{"extraction": {"bare_integers": "never"}}"#,
    )
    .unwrap();

    let config = ReceiptsConfig::from_file(&config_path).unwrap();
    assert_eq!(config.extraction.bare_integers, BareIntegerPolicy::Never);

    let records = ReceiptParser::from_config(RecordedDetections::sidecar(), &config)
        .unwrap()
        .process_receipt(&image)
        .unwrap();

    assert_eq!(
        records,
        vec![
            ProductPrice::new("MILK 1L", "2.49"),
            ProductPrice::new("BREAD WHOLEGRAIN", "€3,10"),
            ProductPrice::new("2 x APPLES", "1.60"),
            ProductPrice::new("EGGS 12", "3.99"),
            ProductPrice::new("COFFEE", "7.50 L"),
            ProductPrice::new("SUBTOTAL", "17.28"),
            ProductPrice::new("TAX", "1.21"),
            ProductPrice::new("TOTAL", "$18.49"),
        ]
    );
}

#[test]
fn test_process_receipt_invalid_file_path() {
    let parser = ReceiptParser::new(RecordedDetections::sidecar());
    let err = parser
        .process_receipt(data_dir().join("non-existent-file.jpg"))
        .unwrap_err();

    assert!(err.is_not_found(), "{:?}", err);
    assert!(err.to_string().contains("non-existent-file.jpg"));
}

#[test]
fn test_missing_recording_is_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("unrecorded.jpg");
    fs::write(&image, b"placeholder").unwrap();

    let err = ReceiptParser::new(RecordedDetections::sidecar())
        .process_receipt(&image)
        .unwrap_err();
    match err {
        ReceiptError::FileAccess { path, .. } => {
            assert_eq!(path, dir.path().join("unrecorded.ocr.json"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_malformed_recording() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("broken.jpg");
    fs::write(&image, b"placeholder").unwrap();
    fs::write(
        dir.path().join("broken.ocr.json"),
        r#"[[[[[0, 0], [10, 0], [10, 10]], ["Milk", 0.9]]]]"#,
    )
    .unwrap();

    let err = ReceiptParser::new(RecordedDetections::sidecar())
        .process_receipt(&image)
        .unwrap_err();
    assert!(matches!(err, ReceiptError::MalformedInput(_)), "{:?}", err);
}
