//! Error handling tests

use schedlag::error::{LagError, REQUIRED_COLUMNS_HINT};
use std::path::PathBuf;

#[test]
fn test_file_not_found_display() {
    let err = LagError::FileNotFound(PathBuf::from("data/lag.csv"));
    assert_eq!(err.to_string(), "The file 'data/lag.csv' was not found");
    assert!(err.is_input_error());
}

#[test]
fn test_unsupported_format_display() {
    let err = LagError::UnsupportedFormat {
        file: "report.pdf".to_string(),
        extension: ".pdf".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains(".pdf"));
    assert!(msg.contains("report.pdf"));
    assert!(msg.contains("xlsx"));
}

#[test]
fn test_header_not_found_display() {
    let err = LagError::HeaderNotFound {
        file: "lag.csv".to_string(),
        max_rows: 20,
        min_score: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains("lag.csv"));
    assert!(msg.contains("first 20 rows"));
    assert!(msg.contains("at least 2"));
}

#[test]
fn test_missing_columns_display() {
    let err = LagError::MissingColumns {
        file: "lag.csv".to_string(),
        missing: vec!["evenflow_flag".to_string()],
        found: vec!["scheduling_lag".to_string(), "region".to_string()],
    };
    let msg = err.to_string();
    assert!(msg.contains("evenflow_flag"));
    assert!(msg.contains("region"));
}

#[test]
fn test_empty_input_display() {
    let err = LagError::EmptyInput {
        file: "empty.csv".to_string(),
    };
    assert!(err.to_string().contains("empty.csv"));
    assert!(err.is_input_error());
}

#[test]
fn test_environment_errors_are_not_input_errors() {
    let io = LagError::from(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "denied",
    ));
    assert!(io.to_string().starts_with("IO error"));
    assert!(!io.is_input_error());
    assert!(!LagError::Export("disk full".to_string()).is_input_error());
    assert!(!LagError::Config("bad".to_string()).is_input_error());
}

#[test]
fn test_yaml_error_conversion() {
    let yaml_err = serde_yaml::from_str::<Vec<u32>>("not: [a list").unwrap_err();
    let err: LagError = yaml_err.into();
    assert!(err.to_string().starts_with("YAML parsing error"));
}

#[test]
fn test_hint_names_required_columns() {
    for column in ["scheduling_lag", "evenflow_flag", "active_appointment_count"] {
        assert!(REQUIRED_COLUMNS_HINT.contains(column));
    }
}
