//! Multi-stage specification validation
//!
//! Every check is a [`Stage`]: a named function from `(input, context)` to
//! either success or a list of findings. The [`pipeline`] module composes the
//! stages and walks the component tree.
//!
//! ```text
//! raw value ─► preprocessing ─► wrapper schema ─┐
//!                                               ▼
//!            ┌────────── per node ─────────────────────────┐
//!            │ schema ─► semantic ─► relational ─► custom  │──► children
//!            └─────────────────────────────────────────────┘
//! ```

pub mod diagnostics;
pub mod pipeline;
pub mod preprocess;
pub mod relational;
pub mod schema;
pub mod semantic;

use serde_json::Value;

pub use diagnostics::{
    has_errors, render_path, ErrorCategory, PathSegment, Severity, StageType, Validated,
    ValidationFailure, ValidationStageError,
};
pub use pipeline::{PipelineBuilder, PipelineOptions, ValidationPipeline};

/// Result of running one stage
pub type StageResult = std::result::Result<(), Vec<ValidationStageError>>;

/// A named, typed unit of validation
///
/// Stages are stateless: everything they may look at arrives through the
/// input and the [`ValidationContext`].
pub trait Stage<T: ?Sized>: Send + Sync {
    fn name(&self) -> &str;

    fn stage_type(&self) -> StageType;

    fn validate(&self, input: &T, ctx: &ValidationContext<'_>) -> StageResult;
}

/// Per-call traversal state
///
/// Cloned on every recursion step, so sibling subtrees never share it.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext<'a> {
    pub development: bool,
    pub stop_at_first_error: bool,
    /// Ancestors from the root down to the immediate parent
    pub ancestors: Vec<&'a Value>,
    /// Findings gathered before this stage ran
    pub previous_errors: &'a [ValidationStageError],
}

impl<'a> ValidationContext<'a> {
    pub fn new(development: bool, stop_at_first_error: bool) -> Self {
        Self {
            development,
            stop_at_first_error,
            ancestors: Vec::new(),
            previous_errors: &[],
        }
    }

    /// Context for the children of `node`
    pub fn descend(&self, node: &'a Value) -> Self {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend_from_slice(&self.ancestors);
        ancestors.push(node);
        Self {
            development: self.development,
            stop_at_first_error: self.stop_at_first_error,
            ancestors,
            previous_errors: &[],
        }
    }

    pub fn with_previous_errors(mut self, previous: &'a [ValidationStageError]) -> Self {
        self.previous_errors = previous;
        self
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn parent(&self) -> Option<&'a Value> {
        self.ancestors.last().copied()
    }

    /// Ancestor kinds joined as `Container > Grid > Box`
    pub fn ancestry(&self) -> String {
        self.ancestors
            .iter()
            .map(|node| {
                crate::spec::kind_of(node)
                    .map(|kind| kind.to_string())
                    .unwrap_or_else(|| "?".to_string())
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descend_copies_ancestors() {
        let root = json!({ "type": "Container" });
        let grid = json!({ "type": "Grid" });

        let ctx = ValidationContext::new(false, false);
        let child = ctx.descend(&root);
        let grandchild = child.descend(&grid);

        assert_eq!(ctx.depth(), 0);
        assert_eq!(child.depth(), 1);
        assert_eq!(grandchild.depth(), 2);
        assert_eq!(grandchild.ancestry(), "Container > Grid");
        assert_eq!(grandchild.parent(), Some(&grid));
    }
}
