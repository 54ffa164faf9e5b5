//! Tests for error module

use corridorfit::error::{CorridorError, OptionExt};

#[test]
fn test_error_display() {
    let err = CorridorError::InsufficientData {
        context: "corridor 3 fit".to_string(),
        point_count: 12,
        minimum_required: 21,
    };
    assert!(err.to_string().contains("corridor 3 fit"));
    assert!(err.to_string().contains("12 points"));
}

#[test]
fn test_lookup_missing_names_code() {
    let err = CorridorError::ExternalLookupMissing {
        code: "XYZ".to_string(),
    };
    assert!(err.to_string().contains("'XYZ'"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_insufficient_data("test", 0, 5);
    assert!(matches!(
        result,
        Err(CorridorError::InsufficientData {
            point_count: 0,
            minimum_required: 5,
            ..
        })
    ));

    let some = Some(7).ok_or_insufficient_data("test", 1, 1);
    assert_eq!(some.unwrap(), 7);
}

#[test]
fn test_json_error_converts() {
    let parsed: Result<Vec<u8>, serde_json::Error> = serde_json::from_str("not json");
    let err: CorridorError = parsed.unwrap_err().into();
    assert!(matches!(err, CorridorError::Json(_)));
}
