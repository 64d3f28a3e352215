//! Specification parser
//!
//! A thin adapter over [`ValidationPipeline`] for callers that predate the
//! multi-stage pipeline. It decodes text, hands the value to the pipeline and
//! maps a failure onto the flat [`SpecificationParserError`] shape. No
//! validation rule lives here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::report;
use crate::spec::Specification;
use crate::validation::{
    ErrorCategory, PipelineOptions, StageType, Validated, ValidationFailure, ValidationPipeline,
    ValidationStageError,
};

/// Raw parser input: serialized text or an already decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum SpecInput {
    Text(String),
    Value(Value),
}

impl From<&str> for SpecInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SpecInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for SpecInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// Legacy Error Shape
// =============================================================================

/// Error kinds known to pre-pipeline callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParserErrorType {
    InvalidFormat,
    SchemaValidation,
    ComponentResolution,
    ReferenceResolution,
    ExpressionParsing,
}

impl ParserErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::SchemaValidation => "SCHEMA_VALIDATION",
            Self::ComponentResolution => "COMPONENT_RESOLUTION",
            Self::ReferenceResolution => "REFERENCE_RESOLUTION",
            Self::ExpressionParsing => "EXPRESSION_PARSING",
        }
    }
}

impl fmt::Display for ParserErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCategory> for ParserErrorType {
    /// Semantic and relational findings have no legacy kind of their own
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::InvalidFormat => Self::InvalidFormat,
            ErrorCategory::ComponentResolution => Self::ComponentResolution,
            ErrorCategory::ReferenceResolution => Self::ReferenceResolution,
            ErrorCategory::ExpressionParsing => Self::ExpressionParsing,
            ErrorCategory::SchemaValidation
            | ErrorCategory::SemanticValidation
            | ErrorCategory::RelationalValidation => Self::SchemaValidation,
        }
    }
}

/// Flat parser error: one primary message plus the full finding list
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{error_type}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct SpecificationParserError {
    #[serde(rename = "type")]
    pub error_type: ParserErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<ValidationStageError>,
}

const SYNTAX_SUGGESTIONS: [&str; 3] = [
    "Check the syntax of your JSON for missing commas, brackets or quotes",
    "Make sure property names are wrapped in double quotes",
    "Validate the document with a JSON linter",
];

impl SpecificationParserError {
    pub fn new(error_type: ParserErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            path: Vec::new(),
            suggestions: Vec::new(),
            validation_errors: Vec::new(),
        }
    }

    /// Text that failed to decode
    pub fn invalid_json(error: &serde_json::Error) -> Self {
        let mut parsed = Self::new(
            ParserErrorType::InvalidFormat,
            format!("Invalid JSON: {}", error),
        );
        parsed.suggestions = SYNTAX_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        parsed
    }

    /// Findings behind this error
    ///
    /// Errors raised before the pipeline ran (undecodable text) become a single
    /// preprocessing finding.
    pub fn into_findings(self) -> Vec<ValidationStageError> {
        if !self.validation_errors.is_empty() {
            return self.validation_errors;
        }

        let mut finding = ValidationStageError::error(StageType::Preprocessing, self.message)
            .with_category(self.error_type.into())
            .at(self.path)
            .with_suggestions(self.suggestions);
        if self.error_type == ParserErrorType::InvalidFormat {
            finding = finding.with_code("SPEC_INVALID_JSON");
        }
        vec![finding]
    }
}

impl From<ParserErrorType> for ErrorCategory {
    fn from(error_type: ParserErrorType) -> Self {
        match error_type {
            ParserErrorType::InvalidFormat => Self::InvalidFormat,
            ParserErrorType::SchemaValidation => Self::SchemaValidation,
            ParserErrorType::ComponentResolution => Self::ComponentResolution,
            ParserErrorType::ReferenceResolution => Self::ReferenceResolution,
            ParserErrorType::ExpressionParsing => Self::ExpressionParsing,
        }
    }
}

impl From<ValidationFailure> for SpecificationParserError {
    fn from(failure: ValidationFailure) -> Self {
        let mut suggestions: Vec<String> = Vec::new();
        for suggestion in failure.errors().flat_map(|f| f.suggestions.iter()) {
            if !suggestions.contains(suggestion) {
                suggestions.push(suggestion.clone());
            }
        }

        let (error_type, message, path) = match failure.primary() {
            Some(primary) => (
                primary.category.into(),
                primary.message.clone(),
                primary.path_segments(),
            ),
            None => (
                ParserErrorType::SchemaValidation,
                "Specification is invalid".to_string(),
                Vec::new(),
            ),
        };

        Self {
            error_type,
            message,
            path,
            suggestions,
            validation_errors: failure.into_findings(),
        }
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Decodes and validates specifications through a [`ValidationPipeline`]
#[derive(Debug, Default)]
pub struct SpecificationParser {
    pipeline: ValidationPipeline,
}

impl SpecificationParser {
    pub fn new(options: PipelineOptions) -> Self {
        Self::from_pipeline(ValidationPipeline::new(options))
    }

    pub fn from_pipeline(pipeline: ValidationPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    /// Parse text or a value into a validated specification
    pub fn parse(
        &self,
        input: impl Into<SpecInput>,
    ) -> Result<Specification, SpecificationParserError> {
        self.parse_validated(input).map(Validated::into_inner)
    }

    /// Like [`parse`](Self::parse), keeping non-blocking findings
    pub fn parse_validated(
        &self,
        input: impl Into<SpecInput>,
    ) -> Result<Validated<Specification>, SpecificationParserError> {
        let value = match input.into() {
            SpecInput::Text(text) => decode(&text)?,
            SpecInput::Value(value) => value,
        };
        Ok(self.pipeline.validate_specification(&value)?)
    }

    pub fn parse_str(&self, text: &str) -> Result<Specification, SpecificationParserError> {
        let value = decode(text)?;
        self.parse_value(&value)
    }

    pub fn parse_value(&self, value: &Value) -> Result<Specification, SpecificationParserError> {
        self.pipeline
            .validate_specification(value)
            .map(Validated::into_inner)
            .map_err(Into::into)
    }

    /// Render a parser error with its path and suggestions
    pub fn format_error(&self, error: &SpecificationParserError) -> String {
        let mut output = format!("Error: {}", error.message);

        if !error.path.is_empty() {
            output.push_str(&format!("\nPath: {}", error.path.join(".")));
        }

        if !error.suggestions.is_empty() {
            output.push_str("\nSuggestions:");
            for suggestion in &error.suggestions {
                output.push_str(&format!("\n - {}", suggestion));
            }
        }

        output
    }

    /// Detailed report of every finding for `input`
    pub fn validation_report(&self, input: impl Into<SpecInput>) -> String {
        match self.parse_validated(input) {
            Ok(validated) => report::detailed_report(&validated.findings),
            Err(error) if error.validation_errors.is_empty() => self.format_error(&error),
            Err(error) => report::detailed_report(&error.validation_errors),
        }
    }
}

fn decode(text: &str) -> Result<Value, SpecificationParserError> {
    debug!(bytes = text.len(), "decoding specification text");
    serde_json::from_str(text).map_err(|e| SpecificationParserError::invalid_json(&e))
}

/// Parse with default options
pub fn parse_specification(
    input: impl Into<SpecInput>,
) -> Result<Specification, SpecificationParserError> {
    SpecificationParser::default().parse(input)
}

/// Detailed report with default options
pub fn create_validation_report(input: impl Into<SpecInput>) -> String {
    SpecificationParser::default().validation_report(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_text_is_invalid_format() {
        let error = parse_specification(r#"{ "version": "1.0.0", "root": { "type": "Box" "#)
            .unwrap_err();
        assert_eq!(error.error_type, ParserErrorType::InvalidFormat);
        assert!(error.message.starts_with("Invalid JSON"));
        assert!(error.suggestions.iter().any(|s| s.contains("syntax")));
        assert!(error.validation_errors.is_empty());
    }

    #[test]
    fn test_decode_failure_becomes_one_finding() {
        let findings = SpecificationParser::default()
            .parse_validated("{ \"type\": ")
            .unwrap_err()
            .into_findings();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].stage, StageType::Preprocessing);
        assert_eq!(findings[0].category, ErrorCategory::InvalidFormat);
        assert_eq!(findings[0].code.as_deref(), Some("SPEC_INVALID_JSON"));
        assert_eq!(findings[0].suggestions.len(), SYNTAX_SUGGESTIONS.len());
    }

    #[test]
    fn test_pipeline_failure_keeps_its_findings() {
        let findings = parse_specification(json!({ "type": "Heading", "level": 7 }))
            .unwrap_err()
            .into_findings();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].code.as_deref(), Some("HEADING_INVALID_LEVEL"));
    }

    #[test]
    fn test_text_and_value_agree() {
        let text = r#"{ "version": "1.0.0", "root": { "type": "Container", "children": [{ "type": "Heading", "children": "Hello World" }] } }"#;
        let from_text = parse_specification(text).unwrap();
        let value: Value = serde_json::from_str(text).unwrap();
        let from_value = parse_specification(value).unwrap();
        assert_eq!(from_text, from_value);

        let ui = from_text.as_ui().unwrap();
        assert_eq!(ui.version, "1.0.0");
    }

    #[test]
    fn test_primary_error_and_suggestions() {
        let error = parse_specification(json!({ "type": "Heading", "level": 7 })).unwrap_err();
        assert_eq!(error.error_type, ParserErrorType::SchemaValidation);
        assert_eq!(error.message, "Heading level must be between 1 and 6");
        assert_eq!(error.path, vec!["level"]);
        assert!(error.suggestions.iter().any(|s| s.contains("between 1 and 6")));
        assert_eq!(error.validation_errors.len(), 2);
    }

    #[test]
    fn test_missing_fields_are_distinguished() {
        let error = parse_specification(json!({ "root": { "type": "Box" } })).unwrap_err();
        assert!(error.suggestions.iter().any(|s| s.to_lowercase().contains("version")));

        let error = parse_specification(json!({ "version": "1.0.0" })).unwrap_err();
        assert!(error.suggestions.iter().any(|s| s.to_lowercase().contains("root")));
    }

    #[test]
    fn test_null_value_mentions_null() {
        let error = parse_specification(Value::Null).unwrap_err();
        assert_eq!(error.error_type, ParserErrorType::InvalidFormat);
        assert!(error.message.to_lowercase().contains("null"));
    }

    #[test]
    fn test_suggestions_are_deduplicated() {
        let error = parse_specification(json!({
            "type": "Box",
            "children": [{ "children": "a" }, { "children": "b" }]
        }))
        .unwrap_err();
        let count = error
            .suggestions
            .iter()
            .filter(|s| s.as_str() == "Add a 'type' property (string)")
            .count();
        assert_eq!(count, 1);
        assert_eq!(error.path, vec!["children", "0"]);
    }

    #[test]
    fn test_format_error() {
        let parser = SpecificationParser::default();
        let error = parser
            .parse(json!({ "type": "Grid", "columns": 15, "children": "x" }))
            .unwrap_err();
        let formatted = parser.format_error(&error);
        assert!(formatted.starts_with("Error: Grid columns must be between 1 and 12"));
        assert!(formatted.contains("Path: columns"));
        assert!(formatted.contains("Suggestions:"));
    }

    #[test]
    fn test_validation_report() {
        let report =
            create_validation_report(json!({ "type": "Grid", "columns": 15, "children": [] }));
        assert!(report.contains("Validation Error Report"));
        assert!(report.contains("SEMANTIC Stage Errors"));
        assert!(report.contains("columns must be between 1 and 12"));
        assert!(report.contains("Grid should contain at least one child item"));

        assert_eq!(create_validation_report(json!({ "type": "Box" })), "No errors found");
        assert!(create_validation_report("{").starts_with("Error: Invalid JSON"));
    }

    #[test]
    fn test_error_serializes_with_legacy_names() {
        let error = SpecificationParserError::new(ParserErrorType::InvalidFormat, "bad");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value, json!({ "type": "INVALID_FORMAT", "message": "bad" }));
    }
}
