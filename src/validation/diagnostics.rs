//! Diagnostics
//!
//! The vocabulary every stage speaks: where a finding lives in the document,
//! which stage raised it, how severe it is, and how to fix it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Category, Stage, Severity
// =============================================================================

/// Closed taxonomy of validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    InvalidFormat,
    SchemaValidation,
    ComponentResolution,
    ReferenceResolution,
    ExpressionParsing,
    SemanticValidation,
    RelationalValidation,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::SchemaValidation => "SCHEMA_VALIDATION",
            Self::ComponentResolution => "COMPONENT_RESOLUTION",
            Self::ReferenceResolution => "REFERENCE_RESOLUTION",
            Self::ExpressionParsing => "EXPRESSION_PARSING",
            Self::SemanticValidation => "SEMANTIC_VALIDATION",
            Self::RelationalValidation => "RELATIONAL_VALIDATION",
        }
    }

    /// Generic remediation advice for the category
    pub fn default_suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::InvalidFormat => &[
                "Check the format of your specification",
                "Ensure all required properties are present",
                "Validate your JSON syntax",
            ],
            Self::SchemaValidation => &[
                "Validate your specification against the schema",
                "Check property types and required fields",
            ],
            Self::ComponentResolution => &[
                "Ensure the component type is registered",
                "Check for typos in component type name",
            ],
            Self::ReferenceResolution => &[
                "Check that all referenced components exist",
                "Ensure references are correctly formatted",
            ],
            Self::ExpressionParsing => &[
                "Validate your expression syntax",
                "Ensure all variables used in expressions are defined",
            ],
            Self::SemanticValidation => &[
                "Check that component properties satisfy semantic constraints",
                "Review component-specific requirements",
            ],
            Self::RelationalValidation => &[
                "Check that component nesting is valid",
                "Ensure parent-child relationships are appropriate",
            ],
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageType {
    Preprocessing,
    Schema,
    Semantic,
    Relational,
    Custom,
}

impl StageType {
    /// All stages, in execution order
    pub const ALL: [StageType; 5] = [
        Self::Preprocessing,
        Self::Schema,
        Self::Semantic,
        Self::Relational,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprocessing => "preprocessing",
            Self::Schema => "schema",
            Self::Semantic => "semantic",
            Self::Relational => "relational",
            Self::Custom => "custom",
        }
    }

    /// Category assigned to findings of this stage unless overridden
    pub fn default_category(&self) -> ErrorCategory {
        match self {
            Self::Preprocessing => ErrorCategory::InvalidFormat,
            Self::Schema | Self::Custom => ErrorCategory::SchemaValidation,
            Self::Semantic => ErrorCategory::SemanticValidation,
            Self::Relational => ErrorCategory::RelationalValidation,
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding severity. Only [`Severity::Error`] fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Path
// =============================================================================

/// One step from the document root towards a node or field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Key(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        Self::Key(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Render a path as `a.b.0.c`
pub fn render_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

// =============================================================================
// Validation Stage Error
// =============================================================================

/// A single finding raised by a validation stage
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("[{stage}] {severity} at '{}': {message}", render_path(.path))]
#[serde(rename_all = "camelCase")]
pub struct ValidationStageError {
    pub path: Vec<PathSegment>,
    pub message: String,
    pub stage: StageType,
    pub severity: Severity,
    pub category: ErrorCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// Extra detail captured in development mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl ValidationStageError {
    pub fn new(stage: StageType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
            stage,
            severity,
            category: stage.default_category(),
            code: None,
            invalid_value: None,
            suggestions: Vec::new(),
            documentation_url: None,
            context: Vec::new(),
        }
    }

    pub fn error(stage: StageType, message: impl Into<String>) -> Self {
        Self::new(stage, Severity::Error, message)
    }

    pub fn warning(stage: StageType, message: impl Into<String>) -> Self {
        Self::new(stage, Severity::Warning, message)
    }

    pub fn info(stage: StageType, message: impl Into<String>) -> Self {
        Self::new(stage, Severity::Info, message)
    }

    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.invalid_value = Some(value);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn with_documentation(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Prepend a traversal prefix to the path
    pub fn prefixed(mut self, prefix: &[PathSegment]) -> Self {
        if !prefix.is_empty() {
            let mut path = prefix.to_vec();
            path.append(&mut self.path);
            self.path = path;
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }

    /// Path segments rendered as strings, indices in decimal
    pub fn path_segments(&self) -> Vec<String> {
        self.path.iter().map(ToString::to_string).collect()
    }
}

/// Whether any finding blocks success
pub fn has_errors(findings: &[ValidationStageError]) -> bool {
    findings.iter().any(ValidationStageError::is_error)
}

// =============================================================================
// Run Outcomes
// =============================================================================

/// A successful run: the document plus non-blocking findings
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub findings: Vec<ValidationStageError>,
}

impl<T> Validated<T> {
    pub fn new(value: T, findings: Vec<ValidationStageError>) -> Self {
        Self { value, findings }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationStageError> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            findings: self.findings,
        }
    }
}

/// A failed run: every finding gathered, at least one of them an error
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{}", crate::report::format_errors(.findings))]
pub struct ValidationFailure {
    findings: Vec<ValidationStageError>,
}

impl ValidationFailure {
    pub fn new(findings: Vec<ValidationStageError>) -> Self {
        Self { findings }
    }

    pub fn findings(&self) -> &[ValidationStageError] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<ValidationStageError> {
        self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationStageError> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationStageError> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// First error-severity finding
    pub fn primary(&self) -> Option<&ValidationStageError> {
        self.errors().next()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl IntoIterator for ValidationFailure {
    type Item = ValidationStageError;
    type IntoIter = std::vec::IntoIter<ValidationStageError>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationFailure {
    type Item = &'a ValidationStageError;
    type IntoIter = std::slice::Iter<'a, ValidationStageError>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_stage_default_category() {
        assert_eq!(
            StageType::Preprocessing.default_category(),
            ErrorCategory::InvalidFormat
        );
        assert_eq!(
            StageType::Relational.default_category(),
            ErrorCategory::RelationalValidation
        );
    }

    #[test]
    fn test_prefix_rewrites_path() {
        let err = ValidationStageError::error(StageType::Semantic, "bad level")
            .at(["level"])
            .prefixed(&[PathSegment::key("children"), PathSegment::Index(1)]);

        assert_eq!(err.path_string(), "children.1.level");
        assert_eq!(err.path_segments(), vec!["children", "1", "level"]);
    }

    #[test]
    fn test_display_names_stage_and_path() {
        let err = ValidationStageError::warning(StageType::Relational, "too deep")
            .at([PathSegment::key("root")]);
        assert_eq!(err.to_string(), "[relational] warning at 'root': too deep");
    }

    #[test]
    fn test_failure_counts() {
        let failure = ValidationFailure::new(vec![
            ValidationStageError::error(StageType::Schema, "missing type"),
            ValidationStageError::warning(StageType::Semantic, "empty grid")
                .with_value(json!([])),
        ]);

        assert_eq!(failure.error_count(), 1);
        assert_eq!(failure.warning_count(), 1);
        assert_eq!(failure.primary().map(|e| e.message.as_str()), Some("missing type"));
        assert!(has_errors(failure.findings()));
    }
}
