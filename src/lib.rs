//! UI Specification Validator
//!
//! Validates server-driven UI documents before anything tries to render them.
//! A document is either a wrapper (`version`, `root`, optional metadata, theme,
//! state and data sources) or a bare component node. Validation produces the
//! typed document or a complete, path-addressed list of findings.
//!
//! ## Features
//!
//! - **Staged Validation**: preprocessing, schema, semantic, relational and custom stages
//! - **Precise Paths**: every finding points at `root.children.1.level`-style locations
//! - **Severity Gating**: only errors fail a run; warnings and info ride along
//! - **Bounded Traversal**: a hard depth ceiling instead of unbounded recursion
//! - **Legacy Parser Shape**: a flat error type for older callers
//!
//! ## Architecture
//!
//! ```text
//! text ──► parser ──► validation::pipeline ──► Validated<Specification>
//!                          │                         │
//!                          ▼                         ▼
//!              preprocess / schema /           report (text, JSON)
//!              semantic / relational
//! ```
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use uispec_validator::ValidationPipeline;
//!
//! let pipeline = ValidationPipeline::default();
//! let failure = pipeline
//!     .validate_component_spec(&json!({ "type": "Grid", "columns": 15, "children": "x" }))
//!     .unwrap_err();
//! assert_eq!(failure.primary().unwrap().path_string(), "columns");
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod spec;
pub mod validation;

pub use config::{OutputConfig, OutputFormat, ValidatorConfig};
pub use error::{Error, Result};
pub use parser::{
    create_validation_report, parse_specification, ParserErrorType, SpecInput,
    SpecificationParser, SpecificationParserError,
};
pub use report::{detailed_report, format_errors, summary_json};
pub use spec::{
    Children, ComponentKind, ComponentSpec, DataSourceSpecification, DataSourceType,
    Specification, SpecificationMetadata, StateSpecification, UISpecification,
};
pub use validation::{
    ErrorCategory, PathSegment, PipelineBuilder, PipelineOptions, Severity, Stage, StageType,
    Validated, ValidationContext, ValidationFailure, ValidationPipeline, ValidationStageError,
};

/// Validate a document of either shape with default options
pub fn validate_specification(
    input: &serde_json::Value,
) -> std::result::Result<Validated<Specification>, ValidationFailure> {
    ValidationPipeline::default().validate_specification(input)
}
