//! Format checks run before anything else looks at the input

use serde_json::Value;

use super::{Stage, StageResult, StageType, ValidationContext, ValidationStageError};

/// Runtime type name of a JSON value
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rejects null and non-object input
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatStage;

impl Stage<Value> for FormatStage {
    fn name(&self) -> &str {
        "Format Validation"
    }

    fn stage_type(&self) -> StageType {
        StageType::Preprocessing
    }

    fn validate(&self, input: &Value, _ctx: &ValidationContext<'_>) -> StageResult {
        match input {
            Value::Null => Err(vec![ValidationStageError::error(
                StageType::Preprocessing,
                "Specification cannot be null",
            )
            .with_code("SPEC_NULL")
            .with_suggestion("Provide a valid specification object")]),
            Value::Object(_) => Ok(()),
            other => Err(vec![ValidationStageError::error(
                StageType::Preprocessing,
                format!("Specification must be an object, got {}", type_name(other)),
            )
            .with_code("SPEC_INVALID_TYPE")
            .with_value(other.clone())
            .with_suggestion("Provide a valid specification object")]),
        }
    }
}
