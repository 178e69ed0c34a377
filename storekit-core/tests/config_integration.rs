//! Parsing store configuration documents.

use storekit_core::{ErrorDomain, NullRepresentation, StoreConfig};
use test_case::test_case;

#[test]
fn test_empty_document_uses_defaults() {
    let config = StoreConfig::from_json("{}").expect("parse");
    assert_eq!(config, StoreConfig::default());
    assert!(!config.read_only);
    assert_eq!(config.busy_timeout_ms, None);
    assert_eq!(config.null_representation, NullRepresentation::Tagged);
}

#[test]
fn test_full_document() {
    let config = StoreConfig::from_json(
        r#"{
            "read_only": true,
            "busy_timeout_ms": 1500,
            "foreign_keys": true,
            "null_representation": "legacy"
        }"#,
    )
    .expect("parse");
    assert!(config.read_only);
    assert_eq!(config.busy_timeout_ms, Some(1500));
    assert!(config.foreign_keys);
    assert_eq!(config.null_representation, NullRepresentation::Legacy);
}

#[test_case("not json" ; "malformed")]
#[test_case(r#"{"busy_timeout_ms": -1}"# ; "negative timeout")]
#[test_case(r#"{"null_representation": "empty"}"# ; "unknown null representation")]
#[test_case(r#"{"journal": "wal"}"# ; "unknown field")]
fn test_invalid_documents_are_open_errors(json: &str) {
    let err = StoreConfig::from_json(json).expect_err("invalid config");
    assert_eq!(err.domain, ErrorDomain::Open);
    assert!(err.message.starts_with("invalid store config"));
}
