//! Parser Tests
//!
//! The flat parser error shape over the validation pipeline.

use serde_json::json;
use uispec_validator::{
    parse_specification, ComponentKind, ParserErrorType, PipelineOptions, Specification,
    SpecificationParser,
};

#[test]
fn test_parse_text_fixture() {
    let spec = parse_specification(include_str!("fixtures/dashboard.json")).unwrap();

    let Specification::Ui(ui) = spec else {
        panic!("expected a wrapper document");
    };
    assert_eq!(ui.version, "1.2.0");
    assert_eq!(ui.root.kind, ComponentKind::Container);
    assert_eq!(
        ui.metadata.and_then(|m| m.title).as_deref(),
        Some("Team Dashboard")
    );
}

#[test]
fn test_malformed_text() {
    let error = parse_specification(include_str!("fixtures/malformed.json")).unwrap_err();

    assert_eq!(error.error_type, ParserErrorType::InvalidFormat);
    assert!(error.message.contains("Invalid JSON"));
    assert!(error.suggestions.iter().any(|s| s.contains("syntax")));
}

#[test]
fn test_primary_error_of_mixed_document() {
    let error = parse_specification(include_str!("fixtures/invalid_mixed.json")).unwrap_err();

    assert_eq!(error.error_type, ParserErrorType::SchemaValidation);
    assert_eq!(error.path, vec!["root", "children", "0", "columns"]);
    assert!(error.message.contains("between 1 and 12"));
    assert_eq!(error.validation_errors.len(), 5);
    assert!(error.suggestions.iter().any(|s| s.contains("type")));
}

#[test]
fn test_bare_component_missing_type() {
    let error = parse_specification(json!({
        "type": "Container",
        "children": [{ "type": "Text", "children": "ok" }, { "children": "no type" }]
    }))
    .unwrap_err();

    assert_eq!(error.path, vec!["children", "1"]);
    assert!(error.message.contains("missing 'type' property"));
    assert!(error.suggestions.iter().any(|s| s.contains("type")));
}

#[test]
fn test_event_handler_without_action() {
    let error = parse_specification(json!({
        "type": "Button",
        "events": { "onClick": { "handler": "save" } },
        "children": "Save"
    }))
    .unwrap_err();

    assert_eq!(error.path, vec!["events", "onClick"]);
    assert!(error.suggestions.iter().any(|s| s.contains("action")));
}

#[test]
fn test_non_object_input() {
    let error = parse_specification("42").unwrap_err();
    assert_eq!(error.error_type, ParserErrorType::InvalidFormat);
    assert!(error.message.contains("must be an object"));
    assert!(error.message.contains("number"));
}

#[test]
fn test_stop_at_first_error_through_parser() {
    let parser = SpecificationParser::new(PipelineOptions {
        stop_at_first_error: true,
        ..PipelineOptions::default()
    });

    let error = parser
        .parse(include_str!("fixtures/invalid_mixed.json"))
        .unwrap_err();
    assert_eq!(error.validation_errors.len(), 1);
}

#[test]
fn test_warnings_survive_parse_validated() {
    let parser = SpecificationParser::default();
    let validated = parser
        .parse_validated(json!({ "type": "Card" }))
        .unwrap();

    assert_eq!(validated.value.root().kind, ComponentKind::Card);
    assert_eq!(validated.warnings().count(), 1);
}

#[test]
fn test_parser_error_json_shape() {
    let error = parse_specification(json!({ "version": "1.0.0" })).unwrap_err();
    let value = serde_json::to_value(&error).unwrap();

    assert_eq!(value["type"], "SCHEMA_VALIDATION");
    assert_eq!(value["path"], json!(["root"]));
    assert_eq!(value["validationErrors"][0]["code"], "UI_SPEC_MISSING_ROOT");
    assert_eq!(value["validationErrors"][0]["stage"], "schema");
}
