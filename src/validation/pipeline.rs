//! Validation pipeline
//!
//! Drives the stages over a document and walks the component tree.
//!
//! ## Traversal
//!
//! Each node runs schema, semantic, relational and custom stages, then its
//! children are walked with the node appended to the ancestor chain. Every
//! subtree returns its own findings with paths relative to itself; the parent
//! prepends `children` (and the index for arrays) while merging them. No error
//! buffer is shared between siblings. A schema error stops descent only when
//! the node has no kind or its children are malformed, and wrapper errors
//! never stop the walk of an object `root`.
//!
//! ## Failure
//!
//! A run fails if and only if some finding has error severity. Warnings and
//! info findings ride along on success. With `stop_at_first_error`, traversal
//! halts at the first stage that reports an error.
//!
//! ## Depth
//!
//! Nodes whose ancestor chain reaches `max_depth` are reported as a fatal
//! relational error and not descended into, which bounds recursion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, debug_span, trace};

use super::preprocess::FormatStage;
use super::relational::{RelationalStage, DEFAULT_NESTING_WARNING_DEPTH};
use super::schema::{ComponentSchemaStage, UiSchemaStage};
use super::semantic::SemanticStage;
use super::{
    has_errors, PathSegment, Stage, StageType, Validated, ValidationContext, ValidationFailure,
    ValidationStageError,
};
use crate::spec::{kind_of, ComponentSpec, Specification, UISpecification, CHILDREN_FIELD};

/// Default hard ceiling on component nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

// =============================================================================
// Options
// =============================================================================

/// Options for a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Attach ancestry context to findings
    pub development: bool,

    /// Halt at the first error-severity finding
    pub stop_at_first_error: bool,

    /// When false, only preprocessing and typed decoding run
    pub validate_schemas: bool,

    /// When false, suggestion lists are dropped from findings
    pub include_suggestions: bool,

    /// Prefix for per-code documentation links
    pub documentation_base_url: Option<String>,

    /// Nodes at this many ancestors are a fatal error
    pub max_depth: usize,

    /// Nodes beyond this many ancestors draw a warning
    pub nesting_warning_depth: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            development: false,
            stop_at_first_error: false,
            validate_schemas: true,
            include_suggestions: true,
            documentation_base_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            nesting_warning_depth: DEFAULT_NESTING_WARNING_DEPTH,
        }
    }
}

// =============================================================================
// Walk
// =============================================================================

/// Findings of one subtree
#[derive(Debug, Default)]
struct Walk {
    findings: Vec<ValidationStageError>,
    halted: bool,
}

impl Walk {
    fn absorb(&mut self, other: Walk, prefix: &[PathSegment]) {
        self.findings
            .extend(other.findings.into_iter().map(|f| f.prefixed(prefix)));
        self.halted |= other.halted;
    }

    fn has_errors(&self) -> bool {
        has_errors(&self.findings)
    }
}

type BoxedStage = Box<dyn Stage<Value>>;

/// A node with a kind and well-shaped children can be checked and descended
/// into even when some of its attributes are invalid
fn is_walkable(node: &Value) -> bool {
    kind_of(node).is_some()
        && matches!(
            node.get(CHILDREN_FIELD),
            None | Some(Value::Null | Value::String(_) | Value::Object(_) | Value::Array(_))
        )
}

// =============================================================================
// Pipeline
// =============================================================================

/// Composes the validation stages and walks specification documents
pub struct ValidationPipeline {
    options: PipelineOptions,
    preprocessing: Vec<BoxedStage>,
    ui_schema: Vec<BoxedStage>,
    component_schema: Vec<BoxedStage>,
    semantic: Vec<BoxedStage>,
    relational: Vec<BoxedStage>,
    custom: Vec<BoxedStage>,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |stages: &[BoxedStage]| -> Vec<String> {
            stages.iter().map(|s| s.name().to_string()).collect()
        };
        f.debug_struct("ValidationPipeline")
            .field("options", &self.options)
            .field("preprocessing", &names(&self.preprocessing))
            .field("ui_schema", &names(&self.ui_schema))
            .field("component_schema", &names(&self.component_schema))
            .field("semantic", &names(&self.semantic))
            .field("relational", &names(&self.relational))
            .field("custom", &names(&self.custom))
            .finish()
    }
}

impl ValidationPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_custom_stages(options, Vec::new())
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    fn with_custom_stages(options: PipelineOptions, custom: Vec<BoxedStage>) -> Self {
        let relational = RelationalStage::new(options.nesting_warning_depth);
        Self {
            options,
            preprocessing: vec![Box::new(FormatStage)],
            ui_schema: vec![Box::new(UiSchemaStage)],
            component_schema: vec![Box::new(ComponentSchemaStage)],
            semantic: vec![Box::new(SemanticStage)],
            relational: vec![Box::new(relational)],
            custom,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn root_context(&self) -> ValidationContext<'static> {
        ValidationContext::new(self.options.development, self.options.stop_at_first_error)
    }

    /// Validate a wrapper document
    pub fn validate_ui_specification(
        &self,
        input: &Value,
    ) -> Result<Validated<UISpecification>, ValidationFailure> {
        let _span = debug_span!("validate_ui_specification").entered();
        let ctx = self.root_context();

        let mut walk = self.run_stages(&self.preprocessing, input, &ctx);
        if walk.has_errors() || !self.options.validate_schemas {
            return self.conclude(walk, || serde_json::from_value(input.clone()));
        }

        walk.absorb(self.run_stages(&self.ui_schema, input, &ctx), &[]);
        if walk.halted {
            return self.conclude(walk, || serde_json::from_value(input.clone()));
        }

        // Wrapper errors do not hide the component tree
        if let Some(root) = input.get("root").filter(|root| root.is_object()) {
            walk.absorb(self.walk_node(root, &ctx), &[PathSegment::key("root")]);
        }
        if !walk.halted {
            walk.absorb(self.run_stages(&self.custom, input, &ctx), &[]);
        }

        self.conclude(walk, || serde_json::from_value(input.clone()))
    }

    /// Validate a bare component tree
    pub fn validate_component_spec(
        &self,
        input: &Value,
    ) -> Result<Validated<ComponentSpec>, ValidationFailure> {
        let _span = debug_span!("validate_component_spec").entered();
        let ctx = self.root_context();

        let mut walk = self.run_stages(&self.preprocessing, input, &ctx);
        if !walk.has_errors() && self.options.validate_schemas {
            walk.absorb(self.walk_node(input, &ctx), &[]);
        }

        self.conclude(walk, || ComponentSpec::try_from(input.clone()))
    }

    /// Validate either document shape
    ///
    /// Objects carrying `version` or `root` are wrapper documents; anything
    /// else is treated as a component node.
    pub fn validate_specification(
        &self,
        input: &Value,
    ) -> Result<Validated<Specification>, ValidationFailure> {
        if UISpecification::is_wrapper(input) {
            self.validate_ui_specification(input)
                .map(|validated| validated.map(Specification::Ui))
        } else {
            self.validate_component_spec(input)
                .map(|validated| validated.map(Specification::Component))
        }
    }

    fn run_stages(
        &self,
        stages: &[BoxedStage],
        input: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Walk {
        let mut walk = Walk::default();

        for stage in stages {
            let result = {
                let stage_ctx = ctx.clone().with_previous_errors(&walk.findings);
                stage.validate(input, &stage_ctx)
            };
            let Err(found) = result else { continue };

            trace!(
                stage = stage.name(),
                stage_type = %stage.stage_type(),
                count = found.len(),
                "stage reported findings"
            );

            let failed = has_errors(&found);
            if ctx.development {
                let ancestry = ctx.ancestry();
                let kind = kind_of(input).map(|k| k.to_string());
                walk.findings.extend(found.into_iter().map(|f| {
                    let f = match &kind {
                        Some(kind) => f.with_context(format!("component: {}", kind)),
                        None => f,
                    };
                    if ancestry.is_empty() {
                        f
                    } else {
                        f.with_context(format!("ancestors: {}", ancestry))
                    }
                }));
            } else {
                walk.findings.extend(found);
            }

            if failed && ctx.stop_at_first_error {
                walk.halted = true;
                break;
            }
        }

        walk
    }

    fn walk_node<'a>(&self, node: &'a Value, ctx: &ValidationContext<'a>) -> Walk {
        trace!(depth = ctx.depth(), kind = ?kind_of(node), "validating component");

        if ctx.depth() >= self.options.max_depth {
            let finding = ValidationStageError::error(
                StageType::Relational,
                format!(
                    "Component nesting exceeds the maximum depth of {} levels",
                    self.options.max_depth
                ),
            )
            .with_code("MAX_DEPTH_EXCEEDED")
            .with_suggestions([
                "Flatten the component structure",
                "Split deeply nested content into separate specifications",
            ]);
            return Walk {
                findings: vec![finding],
                halted: ctx.stop_at_first_error,
            };
        }

        let mut walk = self.run_stages(&self.component_schema, node, ctx);
        if walk.halted || (walk.has_errors() && !is_walkable(node)) {
            return walk;
        }

        for stages in [&self.semantic, &self.relational, &self.custom] {
            walk.absorb(self.run_stages(stages, node, ctx), &[]);
            if walk.halted {
                return walk;
            }
        }

        let Some(children) = node.get(CHILDREN_FIELD) else {
            return walk;
        };
        let child_ctx = ctx.descend(node);

        match children {
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    let prefix = [PathSegment::key(CHILDREN_FIELD), PathSegment::Index(index)];
                    walk.absorb(self.walk_node(child, &child_ctx), &prefix);
                    if walk.halted {
                        break;
                    }
                }
            }
            Value::Object(_) => {
                let prefix = [PathSegment::key(CHILDREN_FIELD)];
                walk.absorb(self.walk_node(children, &child_ctx), &prefix);
            }
            _ => {}
        }

        walk
    }

    fn finalize(&self, findings: Vec<ValidationStageError>) -> Vec<ValidationStageError> {
        findings
            .into_iter()
            .map(|mut finding| {
                if !self.options.include_suggestions {
                    finding.suggestions.clear();
                }
                if finding.documentation_url.is_none() {
                    if let (Some(base), Some(code)) =
                        (&self.options.documentation_base_url, &finding.code)
                    {
                        finding.documentation_url =
                            Some(format!("{}{}", base, code.to_lowercase()));
                    }
                }
                finding
            })
            .collect()
    }

    fn conclude<T, E: std::fmt::Display>(
        &self,
        walk: Walk,
        convert: impl FnOnce() -> Result<T, E>,
    ) -> Result<Validated<T>, ValidationFailure> {
        let mut findings = self.finalize(walk.findings);
        let errors = findings.iter().filter(|f| f.is_error()).count();
        debug!(
            findings = findings.len(),
            errors,
            halted = walk.halted,
            "validation finished"
        );

        if errors > 0 {
            return Err(ValidationFailure::new(findings));
        }

        match convert() {
            Ok(value) => Ok(Validated::new(value, findings)),
            Err(reason) => {
                let finding = ValidationStageError::error(
                    StageType::Schema,
                    format!("Specification could not be decoded: {}", reason),
                )
                .with_category(super::ErrorCategory::InvalidFormat)
                .with_code("SPEC_DECODE_FAILED");
                findings.extend(self.finalize(vec![finding]));
                Err(ValidationFailure::new(findings))
            }
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for a pipeline with custom stages
#[derive(Default)]
pub struct PipelineBuilder {
    options: PipelineOptions,
    custom: Vec<BoxedStage>,
}

impl PipelineBuilder {
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn development(mut self, enabled: bool) -> Self {
        self.options.development = enabled;
        self
    }

    pub fn stop_at_first_error(mut self, enabled: bool) -> Self {
        self.options.stop_at_first_error = enabled;
        self
    }

    pub fn validate_schemas(mut self, enabled: bool) -> Self {
        self.options.validate_schemas = enabled;
        self
    }

    pub fn include_suggestions(mut self, enabled: bool) -> Self {
        self.options.include_suggestions = enabled;
        self
    }

    pub fn documentation_base_url(mut self, url: impl Into<String>) -> Self {
        self.options.documentation_base_url = Some(url.into());
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Register a stage run after the built-in ones on every node
    pub fn with_stage(mut self, stage: impl Stage<Value> + 'static) -> Self {
        self.custom.push(Box::new(stage));
        self
    }

    pub fn build(self) -> ValidationPipeline {
        ValidationPipeline::with_custom_stages(self.options, self.custom)
    }
}
