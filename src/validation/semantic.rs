//! Per-kind business rules
//!
//! Range and enum violations are errors. "Probably empty" heuristics are
//! warnings, since callers gate rendering on severity. Unknown kinds pass.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::Value;

use super::{Stage, StageResult, StageType, ValidationContext, ValidationStageError};
use crate::spec::{kind_of, ComponentKind, CHILDREN_FIELD};

pub const GRID_COLUMNS: (i64, i64) = (1, 12);
pub const HEADING_LEVELS: (i64, i64) = (1, 6);
pub const FLEX_DIRECTIONS: [&str; 4] = ["row", "column", "row-reverse", "column-reverse"];

/// Integral value of a JSON number, rejecting fractions
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn in_range(value: i64, (min, max): (i64, i64)) -> bool {
    (min..=max).contains(&value)
}

/// Parse a `columns` attribute: an integer or a numeric string
pub fn parse_columns(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => as_integer(other),
    }
}

/// Resolve a heading `level`: `3`, `"3"` or `"h3"`
pub fn parse_heading_level(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => {
            let digits = s.strip_prefix(['h', 'H']).unwrap_or(s);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        }
        other => as_integer(other),
    }
}

/// Closest valid flex direction for a typo
fn closest_direction(input: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    FLEX_DIRECTIONS
        .iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, input)
                .map(|score| (score, *candidate))
        })
        .max_by_key(|(score, candidate)| (*score, std::cmp::Reverse(candidate.len())))
        .map(|(_, candidate)| candidate)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn has_accessible_label(node: &Value) -> bool {
    let label = node
        .get("a11y")
        .and_then(|a11y| a11y.get("ariaLabel"))
        .or_else(|| node.get("ariaLabel"));
    matches!(label, Some(Value::String(s)) if !s.trim().is_empty())
}

/// Component-kind semantic validation
#[derive(Debug, Default, Clone, Copy)]
pub struct SemanticStage;

impl SemanticStage {
    fn check_grid(kind: &ComponentKind, node: &Value, findings: &mut Vec<ValidationStageError>) {
        // An explicit null is a value and fails the range check
        if let Some(columns) = node.get("columns") {
            let valid = parse_columns(columns)
                .map(|c| in_range(c, GRID_COLUMNS))
                .unwrap_or(false);
            if !valid {
                findings.push(
                    ValidationStageError::error(
                        StageType::Semantic,
                        format!(
                            "{} columns must be between {} and {}",
                            kind, GRID_COLUMNS.0, GRID_COLUMNS.1
                        ),
                    )
                    .at(["columns"])
                    .with_code("GRID_INVALID_COLUMNS")
                    .with_value(columns.clone())
                    .with_suggestion("Use a value between 1 and 12 for columns"),
                );
            }
        }

        if is_blank(node.get(CHILDREN_FIELD)) {
            findings.push(
                ValidationStageError::warning(
                    StageType::Semantic,
                    format!("{} should contain at least one child item", kind),
                )
                .at([CHILDREN_FIELD])
                .with_code("GRID_EMPTY")
                .with_suggestion("Add child components to the grid"),
            );
        }
    }

    fn check_flex(node: &Value, findings: &mut Vec<ValidationStageError>) {
        let Some(direction) = node.get("direction").filter(|v| !v.is_null()) else {
            return;
        };
        let token = direction.as_str();
        if token.map(|t| FLEX_DIRECTIONS.contains(&t)).unwrap_or(false) {
            return;
        }

        let mut finding = ValidationStageError::error(
            StageType::Semantic,
            match token {
                Some(t) => format!("Invalid flex direction '{}'", t),
                None => "Invalid flex direction".to_string(),
            },
        )
        .at(["direction"])
        .with_code("FLEX_INVALID_DIRECTION")
        .with_value(direction.clone())
        .with_suggestion(format!("Use one of: {}", FLEX_DIRECTIONS.join(", ")));

        if let Some(guess) = token.and_then(closest_direction) {
            finding = finding.with_suggestion(format!("Did you mean '{}'?", guess));
        }
        findings.push(finding);
    }

    fn check_heading_level(node: &Value, findings: &mut Vec<ValidationStageError>) {
        let Some(level) = node.get("level").filter(|v| !v.is_null()) else {
            return;
        };
        let valid = parse_heading_level(level)
            .map(|l| in_range(l, HEADING_LEVELS))
            .unwrap_or(false);
        if valid {
            return;
        }

        let suggestion = if level.is_string() {
            "Use a value between h1 and h6 for heading level"
        } else {
            "Use a value between 1 and 6 for heading level"
        };
        findings.push(
            ValidationStageError::error(
                StageType::Semantic,
                format!(
                    "Heading level must be between {} and {}",
                    HEADING_LEVELS.0, HEADING_LEVELS.1
                ),
            )
            .at(["level"])
            .with_code("HEADING_INVALID_LEVEL")
            .with_value(level.clone())
            .with_suggestion(suggestion),
        );
    }

    fn check_content(kind: &ComponentKind, node: &Value, findings: &mut Vec<ValidationStageError>) {
        if !is_blank(node.get(CHILDREN_FIELD)) || has_accessible_label(node) {
            return;
        }

        let (message, code, suggestions): (&str, &str, &[&str]) = match kind {
            ComponentKind::Container => (
                "Container should contain child content",
                "CONTAINER_EMPTY",
                &["Add child components to the container"],
            ),
            ComponentKind::Card => (
                "Card should contain content",
                "CARD_EMPTY",
                &["Add child components to the card"],
            ),
            ComponentKind::Text => (
                "Text component should contain content",
                "TEXT_EMPTY",
                &["Add text content"],
            ),
            ComponentKind::Button => (
                "Button should have either children or ariaLabel",
                "BUTTON_NO_LABEL",
                &[
                    "Add text content to the button",
                    "Add ariaLabel property to a11y object",
                ],
            ),
            ComponentKind::Heading => (
                "Heading should contain content",
                "HEADING_EMPTY",
                &["Add heading text content"],
            ),
            _ => return,
        };

        findings.push(
            ValidationStageError::warning(StageType::Semantic, message)
                .at([CHILDREN_FIELD])
                .with_code(code)
                .with_suggestions(suggestions.iter().copied()),
        );
    }
}

impl Stage<Value> for SemanticStage {
    fn name(&self) -> &str {
        "Component Semantic Validation"
    }

    fn stage_type(&self) -> StageType {
        StageType::Semantic
    }

    fn validate(&self, input: &Value, _ctx: &ValidationContext<'_>) -> StageResult {
        let Some(kind) = kind_of(input) else {
            return Ok(());
        };

        let mut findings = Vec::new();
        match &kind {
            ComponentKind::Grid | ComponentKind::SimpleGrid => {
                Self::check_grid(&kind, input, &mut findings)
            }
            ComponentKind::Flex => Self::check_flex(input, &mut findings),
            ComponentKind::Heading => {
                Self::check_heading_level(input, &mut findings);
                Self::check_content(&kind, input, &mut findings);
            }
            ComponentKind::Container
            | ComponentKind::Card
            | ComponentKind::Text
            | ComponentKind::Button => Self::check_content(&kind, input, &mut findings),
            ComponentKind::Box | ComponentKind::Other(_) => {}
        }

        if findings.is_empty() {
            Ok(())
        } else {
            Err(findings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ErrorCategory, Severity};
    use serde_json::json;

    fn run(value: Value) -> StageResult {
        SemanticStage.validate(&value, &ValidationContext::default())
    }

    #[test]
    fn test_grid_columns_range() {
        for columns in 1..=12 {
            let grid = json!({
                "type": "Grid",
                "columns": columns,
                "children": [{ "type": "Box" }]
            });
            assert!(run(grid).is_ok(), "columns = {}", columns);
        }

        let errors = run(json!({ "type": "Grid", "columns": 15, "children": [{ "type": "Box" }] }))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("between 1 and 12"));
        assert_eq!(errors[0].category, ErrorCategory::SemanticValidation);
        assert_eq!(errors[0].invalid_value, Some(json!(15)));
        assert_eq!(errors[0].path_string(), "columns");
    }

    #[test]
    fn test_grid_columns_parsing() {
        assert_eq!(parse_columns(&json!("4")), Some(4));
        assert_eq!(parse_columns(&json!(3.0)), Some(3));
        assert_eq!(parse_columns(&json!(3.5)), None);
        assert_eq!(parse_columns(&json!({ "md": 3 })), None);
        assert_eq!(parse_columns(&Value::Null), None);
    }

    #[test]
    fn test_null_columns_rejected() {
        let grid = json!({ "type": "Grid", "columns": null, "children": [{ "type": "Box" }] });
        let errors = run(grid).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code.as_deref(), Some("GRID_INVALID_COLUMNS"));
        assert_eq!(errors[0].invalid_value, Some(Value::Null));
    }

    #[test]
    fn test_empty_grid_is_warning() {
        for grid in [json!({ "type": "Grid" }), json!({ "type": "Grid", "children": [] })] {
            let findings = run(grid).unwrap_err();
            assert_eq!(findings.len(), 1);
            assert_eq!(findings[0].severity, Severity::Warning);
            assert!(findings[0].message.contains("at least one child item"));
        }
    }

    #[test]
    fn test_heading_levels() {
        for level in [json!(1), json!(6), json!("h1"), json!("h6"), json!("3")] {
            let heading = json!({ "type": "Heading", "level": level, "children": "Title" });
            assert!(run(heading).is_ok());
        }
        for level in [
            json!(7),
            json!("h7"),
            json!(0),
            json!("hx"),
            json!(true),
            json!("h+3"),
            json!("+3"),
            json!("h"),
        ] {
            let heading = json!({ "type": "Heading", "level": level, "children": "Title" });
            let errors = run(heading).unwrap_err();
            assert_eq!(errors[0].severity, Severity::Error);
            assert_eq!(errors[0].code.as_deref(), Some("HEADING_INVALID_LEVEL"));
        }
    }

    #[test]
    fn test_flex_direction() {
        assert!(run(json!({ "type": "Flex", "direction": "row-reverse" })).is_ok());
        assert!(run(json!({ "type": "Flex" })).is_ok());

        let errors = run(json!({ "type": "Flex", "direction": "colum" })).unwrap_err();
        assert_eq!(errors[0].severity, Severity::Error);
        assert!(errors[0].suggestions[0].contains("row, column, row-reverse, column-reverse"));
        assert!(errors[0].suggestions.iter().any(|s| s.contains("Did you mean")));
    }

    #[test]
    fn test_missing_content_is_warning() {
        let findings = run(json!({ "type": "Container" })).unwrap_err();
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].code.as_deref(), Some("CONTAINER_EMPTY"));

        assert!(run(json!({ "type": "Button", "a11y": { "ariaLabel": "Close" } })).is_ok());
        let findings = run(json!({ "type": "Button" })).unwrap_err();
        assert_eq!(findings[0].code.as_deref(), Some("BUTTON_NO_LABEL"));
    }

    #[test]
    fn test_unknown_kind_passes() {
        assert!(run(json!({ "type": "Carousel", "columns": 99, "level": "h9" })).is_ok());
    }
}
