//! Rules that depend on where a node sits in the tree
//!
//! This is the only stage that reads the ancestor chain. It never changes it.

use serde_json::Value;

use super::{Stage, StageResult, StageType, ValidationContext, ValidationStageError};
use crate::spec::{kind_of, ComponentKind};

/// Ancestor count above which nesting draws a warning
pub const DEFAULT_NESTING_WARNING_DEPTH: usize = 10;

/// A parent/child kind pair that should not occur
struct ForbiddenNesting {
    parent: fn(&ComponentKind) -> bool,
    child: fn(&ComponentKind) -> bool,
    code: &'static str,
    message: &'static str,
    suggestions: &'static [&'static str],
}

const FORBIDDEN_NESTING: &[ForbiddenNesting] = &[
    ForbiddenNesting {
        parent: ComponentKind::is_heading_like,
        child: ComponentKind::is_heading_like,
        code: "INVALID_HEADING_NESTING",
        message: "Heading components should not be nested inside other headings",
        suggestions: &[
            "Use Text component instead of nested Heading",
            "Place headings in separate container components",
        ],
    },
    ForbiddenNesting {
        parent: |kind: &ComponentKind| matches!(kind, ComponentKind::Button),
        child: |kind: &ComponentKind| matches!(kind, ComponentKind::Button),
        code: "INVALID_BUTTON_NESTING",
        message: "Button components should not be nested inside other buttons",
        suggestions: &["Place buttons side by side in a Flex or Box"],
    },
];

/// Nesting depth and parent/child pair checks
#[derive(Debug, Clone, Copy)]
pub struct RelationalStage {
    nesting_warning_depth: usize,
}

impl Default for RelationalStage {
    fn default() -> Self {
        Self::new(DEFAULT_NESTING_WARNING_DEPTH)
    }
}

impl RelationalStage {
    pub fn new(nesting_warning_depth: usize) -> Self {
        Self {
            nesting_warning_depth,
        }
    }
}

impl Stage<Value> for RelationalStage {
    fn name(&self) -> &str {
        "Component Relationship Validation"
    }

    fn stage_type(&self) -> StageType {
        StageType::Relational
    }

    fn validate(&self, input: &Value, ctx: &ValidationContext<'_>) -> StageResult {
        let mut findings = Vec::new();

        if ctx.depth() > self.nesting_warning_depth {
            findings.push(
                ValidationStageError::warning(
                    StageType::Relational,
                    format!(
                        "Component nesting is too deep (> {} levels)",
                        self.nesting_warning_depth
                    ),
                )
                .with_code("EXCESSIVE_NESTING")
                .with_suggestions([
                    "Simplify component structure",
                    "Extract deeply nested content into separate components",
                ]),
            );
        }

        let parent_kind = ctx.parent().and_then(kind_of);
        if let (Some(parent), Some(child)) = (parent_kind, kind_of(input)) {
            for rule in FORBIDDEN_NESTING {
                if (rule.parent)(&parent) && (rule.child)(&child) {
                    findings.push(
                        ValidationStageError::warning(StageType::Relational, rule.message)
                            .with_code(rule.code)
                            .with_suggestions(rule.suggestions.iter().copied()),
                    );
                }
            }
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
    use crate::validation::Severity;
    use serde_json::json;

    #[test]
    fn test_heading_inside_heading_warns() {
        let parent = json!({ "type": "Heading", "children": [] });
        let ctx = ValidationContext::default().descend(&parent);

        let findings = RelationalStage::default()
            .validate(&json!({ "type": "Heading", "children": "Sub" }), &ctx)
            .unwrap_err();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("should not be nested inside other headings"));
    }

    #[test]
    fn test_depth_warning_threshold() {
        let node = json!({ "type": "Box" });
        let stage = RelationalStage::new(2);

        let mut ctx = ValidationContext::default();
        for _ in 0..2 {
            ctx = ctx.descend(&node);
        }
        assert!(stage.validate(&node, &ctx).is_ok());

        let deeper = ctx.descend(&node);
        let findings = stage.validate(&node, &deeper).unwrap_err();
        assert_eq!(findings[0].code.as_deref(), Some("EXCESSIVE_NESTING"));
        assert_eq!(deeper.depth(), 3);
    }

    #[test]
    fn test_unrelated_kinds_pass() {
        let parent = json!({ "type": "Card" });
        let ctx = ValidationContext::default().descend(&parent);
        assert!(RelationalStage::default()
            .validate(&json!({ "type": "Heading" }), &ctx)
            .is_ok());
    }
}
