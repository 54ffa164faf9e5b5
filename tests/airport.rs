//! Tests for airport reference lookup

use corridorfit::{AirportLookup, AirportReference, AirportTable, CorridorError};

const TABLE: &str = r#"[
    {"code": "BOS", "latitude": 42.3656, "longitude": -71.0096, "elevationFt": 20.0},
    {"code": "SFO", "latitude": 37.6213, "longitude": -122.379, "elevationFt": 13.0}
]"#;

#[test]
fn test_table_from_json() {
    let table = AirportTable::from_json_str(TABLE).unwrap();
    assert_eq!(table.len(), 2);

    let sfo = table.lookup("SFO").unwrap();
    assert_eq!(sfo.latitude, 37.6213);
    assert_eq!(sfo.elevation_ft, 13.0);
}

#[test]
fn test_resolve_missing_code() {
    let table = AirportTable::from_json_str(TABLE).unwrap();
    assert!(table.lookup("XYZ").is_none());
    assert!(matches!(
        table.resolve("XYZ"),
        Err(CorridorError::ExternalLookupMissing { ref code }) if code == "XYZ"
    ));
}

#[test]
fn test_malformed_table_is_json_error() {
    assert!(matches!(
        AirportTable::from_json_str("{\"code\": 1}"),
        Err(CorridorError::Json(_))
    ));
}

#[test]
fn test_custom_lookup_gets_resolve() {
    struct Fixed;
    impl AirportLookup for Fixed {
        fn lookup(&self, code: &str) -> Option<AirportReference> {
            (code == "ORD").then(|| AirportReference {
                code: "ORD".to_string(),
                latitude: 41.9742,
                longitude: -87.9073,
                elevation_ft: 672.0,
            })
        }
    }

    assert_eq!(Fixed.resolve("ORD").unwrap().elevation_ft, 672.0);
    assert!(Fixed.resolve("BOS").is_err());
}
