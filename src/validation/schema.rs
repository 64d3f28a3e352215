//! Structural checks for wrapper documents and component nodes
//!
//! Both schemas are open-world: fields they do not declare are accepted so
//! newer documents still validate against older builds. Nothing here coerces
//! or drops input.

use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};

use super::preprocess::type_name;
use super::{
    ErrorCategory, PathSegment, Stage, StageResult, StageType, ValidationContext,
    ValidationStageError,
};
use crate::spec::{CHILDREN_FIELD, KIND_FIELD};

/// Declared shapes of the optional wrapper sections
static WRAPPER_SECTIONS: LazyLock<JSONSchema> = LazyLock::new(|| {
    let schema = json!({
        "type": "object",
        "properties": {
            "metadata": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "author": { "type": "string" },
                    "createdAt": { "type": "string" },
                    "updatedAt": { "type": "string" },
                    "tags": { "type": "array", "items": { "type": "string" } }
                }
            },
            "theme": { "type": "object" },
            "state": {
                "type": "object",
                "required": ["initial"],
                "properties": {
                    "initial": { "type": "object" }
                }
            },
            "dataSources": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "type", "config"],
                    "properties": {
                        "id": { "type": "string" },
                        "type": { "enum": ["rest", "graphql", "static", "websocket", "function"] },
                        "config": { "type": "object" }
                    }
                }
            }
        }
    });
    JSONSchema::compile(&schema).expect("wrapper section schema is valid")
});

/// Split a JSON pointer (`/dataSources/0/id`) into path segments
fn pointer_segments(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| match chunk.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(chunk.replace("~1", "/").replace("~0", "~")),
        })
        .collect()
}

// =============================================================================
// Wrapper Schema
// =============================================================================

/// Checks `version`, `root` and the optional sections of a wrapper document
#[derive(Debug, Default, Clone, Copy)]
pub struct UiSchemaStage;

impl UiSchemaStage {
    fn check_version(obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        match obj.get("version") {
            None => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    "Invalid UI specification: missing required property 'version'",
                )
                .at(["version"])
                .with_code("UI_SPEC_MISSING_VERSION")
                .with_suggestion("Add a version property (string), e.g. \"1.0.0\""),
            ),
            Some(Value::String(version)) if version.trim().is_empty() => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    "Invalid UI specification: version must be a non-empty string",
                )
                .at(["version"])
                .with_category(ErrorCategory::InvalidFormat)
                .with_code("UI_SPEC_INVALID_VERSION")
                .with_value(Value::String(version.clone()))
                .with_suggestion("Use a semantic version such as \"1.0.0\""),
            ),
            Some(Value::String(version)) => {
                let bare = version.strip_prefix('v').unwrap_or(version);
                if semver::Version::parse(bare).is_err() {
                    errors.push(
                        ValidationStageError::info(
                            StageType::Schema,
                            format!("version '{}' is not a semantic version", version),
                        )
                        .at(["version"])
                        .with_code("UI_SPEC_VERSION_NOT_SEMVER")
                        .with_value(Value::String(version.clone()))
                        .with_suggestion("Use MAJOR.MINOR.PATCH, e.g. \"1.0.0\""),
                    );
                }
            }
            Some(other) => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    format!(
                        "Invalid UI specification: version must be a string, got {}",
                        type_name(other)
                    ),
                )
                .at(["version"])
                .with_category(ErrorCategory::InvalidFormat)
                .with_code("UI_SPEC_INVALID_VERSION")
                .with_value(other.clone())
                .with_suggestion("Quote the version, e.g. \"1.0.0\""),
            ),
        }
    }

    fn check_root(obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        match obj.get("root") {
            None => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    "Invalid UI specification: missing required property 'root'",
                )
                .at(["root"])
                .with_code("UI_SPEC_MISSING_ROOT")
                .with_suggestion("Add a root property holding a component specification"),
            ),
            Some(Value::Object(_)) => {}
            Some(other) => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    format!(
                        "Invalid UI specification: root must be an object, got {}",
                        type_name(other)
                    ),
                )
                .at(["root"])
                .with_category(ErrorCategory::InvalidFormat)
                .with_code("UI_SPEC_INVALID_ROOT")
                .with_value(other.clone())
                .with_suggestion("Make root a component specification object with a 'type'"),
            ),
        }
    }

    fn check_sections(input: &Value, errors: &mut Vec<ValidationStageError>) {
        if let Err(violations) = WRAPPER_SECTIONS.validate(input) {
            for violation in violations {
                errors.push(
                    ValidationStageError::error(StageType::Schema, violation.to_string())
                        .at(pointer_segments(&violation.instance_path.to_string()))
                        .with_code("UI_SPEC_SCHEMA")
                        .with_value(violation.instance.into_owned())
                        .with_suggestions(
                            ErrorCategory::SchemaValidation
                                .default_suggestions()
                                .iter()
                                .copied(),
                        ),
                );
            }
        }
    }
}

impl Stage<Value> for UiSchemaStage {
    fn name(&self) -> &str {
        "UI Schema Validation"
    }

    fn stage_type(&self) -> StageType {
        StageType::Schema
    }

    fn validate(&self, input: &Value, _ctx: &ValidationContext<'_>) -> StageResult {
        let Some(obj) = input.as_object() else {
            return Err(vec![ValidationStageError::error(
                StageType::Schema,
                "Invalid UI specification: expected an object",
            )
            .with_category(ErrorCategory::InvalidFormat)
            .with_code("UI_SPEC_INVALID_TYPE")]);
        };

        let mut errors = Vec::new();
        Self::check_version(obj, &mut errors);
        Self::check_root(obj, &mut errors);
        Self::check_sections(input, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Component Schema
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    String,
    Boolean,
    Object,
}

impl Expected {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

/// Base attributes shared by every component kind
const BASE_ATTRIBUTES: &[(&str, Expected)] = &[
    ("id", Expected::String),
    ("key", Expected::String),
    ("className", Expected::String),
    ("style", Expected::Object),
    ("a11y", Expected::Object),
    ("props", Expected::Object),
    ("events", Expected::Object),
    ("hidden", Expected::Boolean),
    ("disabled", Expected::Boolean),
];

/// Checks that a node has a kind and well-typed base attributes
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentSchemaStage;

impl ComponentSchemaStage {
    fn check_kind(node: &Value, obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        match obj.get(KIND_FIELD) {
            Some(Value::String(kind)) if !kind.is_empty() => {}
            Some(Value::String(_)) => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    "Invalid component specification: 'type' property must be a non-empty string",
                )
                .at([KIND_FIELD])
                .with_code("COMPONENT_EMPTY_TYPE")
                .with_value(Value::String(String::new()))
                .with_suggestion("Set type to a component name such as \"Box\""),
            ),
            Some(other) => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    format!(
                        "Invalid component specification: missing 'type' property or 'type' is not a string (got {})",
                        type_name(other)
                    ),
                )
                .with_code("COMPONENT_MISSING_TYPE")
                .with_value(node.clone())
                .with_suggestions([
                    "Add a 'type' property (string)",
                    "Ensure type property is a valid component type",
                ]),
            ),
            None => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    "Invalid component specification: missing 'type' property",
                )
                .with_code("COMPONENT_MISSING_TYPE")
                .with_value(node.clone())
                .with_suggestions([
                    "Add a 'type' property (string)",
                    "Ensure type property is a valid component type",
                ]),
            ),
        }
    }

    fn check_attributes(obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        for (name, expected) in BASE_ATTRIBUTES {
            let Some(value) = obj.get(*name) else { continue };
            if value.is_null() || expected.matches(value) {
                continue;
            }
            errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    format!(
                        "Expected {} for '{}', received {}",
                        expected.describe(),
                        name,
                        type_name(value)
                    ),
                )
                .at([*name])
                .with_code("INVALID_ATTRIBUTE_TYPE")
                .with_value(value.clone())
                .with_suggestions([
                    "Check the type of the property".to_string(),
                    format!("Ensure '{}' has the correct type", name),
                ]),
            );
        }
    }

    fn check_children(obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        match obj.get(CHILDREN_FIELD) {
            None
            | Some(Value::Null)
            | Some(Value::String(_))
            | Some(Value::Object(_))
            | Some(Value::Array(_)) => {}
            Some(other) => errors.push(
                ValidationStageError::error(
                    StageType::Schema,
                    format!(
                        "Invalid children format: expected string, component, or array of components, got {}",
                        type_name(other)
                    ),
                )
                .at([CHILDREN_FIELD])
                .with_code("INVALID_CHILDREN")
                .with_value(other.clone())
                .with_suggestion("Use a text string, a component object or an array of components"),
            ),
        }
    }

    fn check_events(obj: &Map<String, Value>, errors: &mut Vec<ValidationStageError>) {
        let Some(events) = obj.get("events").and_then(Value::as_object) else {
            return;
        };
        for (event, handler) in events {
            let has_action = handler.get("action").map(Value::is_string).unwrap_or(false);
            if !has_action {
                errors.push(
                    ValidationStageError::error(
                        StageType::Schema,
                        format!(
                            "Invalid event handler for '{}': missing required 'action' property",
                            event
                        ),
                    )
                    .at(["events", event.as_str()])
                    .with_code("INVALID_EVENT_HANDLER")
                    .with_value(handler.clone())
                    .with_suggestion("Give the handler an object with a string 'action'"),
                );
            }
        }
    }
}

impl Stage<Value> for ComponentSchemaStage {
    fn name(&self) -> &str {
        "Component Schema Validation"
    }

    fn stage_type(&self) -> StageType {
        StageType::Schema
    }

    fn validate(&self, input: &Value, _ctx: &ValidationContext<'_>) -> StageResult {
        let Some(obj) = input.as_object() else {
            return Err(vec![ValidationStageError::error(
                StageType::Schema,
                format!("Child component must be an object, got {}", type_name(input)),
            )
            .with_code("COMPONENT_NOT_OBJECT")
            .with_value(input.clone())
            .with_suggestion("Provide a valid component specification object")]);
        };

        let mut errors = Vec::new();
        Self::check_kind(input, obj, &mut errors);
        Self::check_attributes(obj, &mut errors);
        Self::check_children(obj, &mut errors);
        Self::check_events(obj, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;

    fn wrapper(value: Value) -> StageResult {
        UiSchemaStage.validate(&value, &ValidationContext::default())
    }

    fn component(value: Value) -> StageResult {
        ComponentSchemaStage.validate(&value, &ValidationContext::default())
    }

    #[test]
    fn test_missing_version_and_root_are_distinct() {
        let errors = wrapper(json!({ "root": { "type": "Box" } })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("version"));
        assert_eq!(errors[0].code.as_deref(), Some("UI_SPEC_MISSING_VERSION"));

        let errors = wrapper(json!({ "version": "1.0.0" })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("root"));
        assert_eq!(errors[0].code.as_deref(), Some("UI_SPEC_MISSING_ROOT"));
    }

    #[test]
    fn test_non_semver_version_is_info() {
        let findings = wrapper(json!({ "version": "latest", "root": { "type": "Box" } }))
            .unwrap_err();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);

        assert!(wrapper(json!({ "version": "v2.1.0", "root": { "type": "Box" } })).is_ok());
    }

    #[test]
    fn test_optional_sections_checked() {
        let errors = wrapper(json!({
            "version": "1.0.0",
            "root": { "type": "Box" },
            "metadata": { "title": 42 },
            "dataSources": [{ "id": "users", "type": "ftp", "config": {} }]
        }))
        .unwrap_err();

        let paths: Vec<String> = errors.iter().map(|e| e.path_string()).collect();
        assert!(paths.contains(&"metadata.title".to_string()));
        assert!(paths.contains(&"dataSources.0.type".to_string()));
    }

    #[test]
    fn test_unknown_wrapper_fields_accepted() {
        assert!(wrapper(json!({
            "version": "1.0.0",
            "root": { "type": "Box" },
            "experimental": { "anything": true }
        }))
        .is_ok());
    }

    #[test]
    fn test_component_missing_type_points_at_node() {
        let errors = component(json!({ "children": "X" })).unwrap_err();
        assert!(errors[0].message.contains("missing 'type' property"));
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn test_component_attribute_types() {
        let errors = component(json!({
            "type": "Box",
            "className": 3,
            "hidden": "yes",
            "customThing": [1, 2, 3]
        }))
        .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code.as_deref() == Some("INVALID_ATTRIBUTE_TYPE")));
    }

    #[test]
    fn test_component_children_and_events() {
        let errors = component(json!({
            "type": "Button",
            "children": 12,
            "events": { "click": { "action": "submit" }, "hover": {} }
        }))
        .unwrap_err();

        let paths: Vec<String> = errors.iter().map(|e| e.path_string()).collect();
        assert_eq!(paths, vec!["children", "events.hover"]);
    }
}
