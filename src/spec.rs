//! Specification document types
//!
//! A UI specification is a JSON document wrapping a tree of component nodes.
//! The validation pipeline works on raw [`serde_json::Value`]s; once a
//! document passes, it is converted into the typed model defined here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Wire name of the field carrying a node's kind.
pub const KIND_FIELD: &str = "type";

/// Wire name of the field carrying a node's children.
pub const CHILDREN_FIELD: &str = "children";

/// Nesting ceiling for typed conversion of untrusted values.
const MAX_CONVERSION_DEPTH: usize = 256;

// =============================================================================
// Component Kind
// =============================================================================

/// Kind of a component node
///
/// Known kinds get their own variant so rule dispatch is an exhaustive match;
/// everything else lands in [`ComponentKind::Other`] and passes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Box,
    Container,
    Grid,
    SimpleGrid,
    Flex,
    Heading,
    Text,
    Button,
    Card,
    Other(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Box => "Box",
            Self::Container => "Container",
            Self::Grid => "Grid",
            Self::SimpleGrid => "SimpleGrid",
            Self::Flex => "Flex",
            Self::Heading => "Heading",
            Self::Text => "Text",
            Self::Button => "Button",
            Self::Card => "Card",
            Self::Other(name) => name,
        }
    }

    /// Grid-like kinds carry a `columns` attribute
    pub fn is_grid_like(&self) -> bool {
        matches!(self, Self::Grid | Self::SimpleGrid)
    }

    pub fn is_heading_like(&self) -> bool {
        matches!(self, Self::Heading)
    }

    pub fn is_flex_like(&self) -> bool {
        matches!(self, Self::Flex)
    }

    /// Kinds that are probably a mistake when they render nothing
    pub fn requires_content(&self) -> bool {
        matches!(
            self,
            Self::Container | Self::Card | Self::Text | Self::Button | Self::Heading
        )
    }
}

impl From<&str> for ComponentKind {
    fn from(name: &str) -> Self {
        match name {
            "Box" => Self::Box,
            "Container" => Self::Container,
            "Grid" => Self::Grid,
            "SimpleGrid" => Self::SimpleGrid,
            "Flex" => Self::Flex,
            "Heading" => Self::Heading,
            "Text" => Self::Text,
            "Button" => Self::Button,
            "Card" => Self::Card,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ComponentKind {
    fn from(name: String) -> Self {
        match Self::from(name.as_str()) {
            Self::Other(_) => Self::Other(name),
            known => known,
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a raw node, if it carries a non-empty string `type`
pub fn kind_of(value: &Value) -> Option<ComponentKind> {
    value
        .get(KIND_FIELD)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ComponentKind::from)
}

// =============================================================================
// Component Spec
// =============================================================================

/// Children of a component node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Children {
    #[default]
    None,
    Text(String),
    Single(Box<ComponentSpec>),
    Many(Vec<ComponentSpec>),
}

impl Children {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(text) => text.is_empty(),
            Self::Single(_) => false,
            Self::Many(items) => items.is_empty(),
        }
    }
}

/// One node of the component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    /// Every declared attribute other than `type` and `children`
    pub attributes: Map<String, Value>,
    pub children: Children,
}

/// A raw value that cannot be read as a component tree
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid component at '{path}': {reason}")]
pub struct ShapeError {
    pub path: String,
    pub reason: &'static str,
}

impl ShapeError {
    fn new(reason: &'static str) -> Self {
        Self {
            path: String::new(),
            reason,
        }
    }

    fn within(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", segment, self.path)
        };
        self
    }
}

impl ComponentSpec {
    pub fn new(kind: impl Into<ComponentKind>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Map::new(),
            children: Children::None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_children(mut self, children: Children) -> Self {
        self.children = children;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Convert back into the raw wire form
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }

    fn from_value_at(value: Value, depth: usize) -> Result<Self, ShapeError> {
        if depth > MAX_CONVERSION_DEPTH {
            return Err(ShapeError::new("nesting exceeds the conversion limit"));
        }

        let Value::Object(mut attributes) = value else {
            return Err(ShapeError::new("component must be an object"));
        };

        let kind = match attributes.remove(KIND_FIELD) {
            Some(Value::String(name)) if !name.is_empty() => ComponentKind::from(name),
            _ => return Err(ShapeError::new("missing 'type' property")),
        };

        let children = match attributes.remove(CHILDREN_FIELD) {
            None | Some(Value::Null) => Children::None,
            Some(Value::String(text)) => Children::Text(text),
            Some(child @ Value::Object(_)) => Children::Single(Box::new(
                Self::from_value_at(child, depth + 1).map_err(|e| e.within(CHILDREN_FIELD))?,
            )),
            Some(Value::Array(items)) => {
                let mut parsed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let child = Self::from_value_at(item, depth + 1).map_err(|e| {
                        e.within(&index.to_string()).within(CHILDREN_FIELD)
                    })?;
                    parsed.push(child);
                }
                Children::Many(parsed)
            }
            Some(_) => {
                return Err(ShapeError::new(
                    "children must be a string, a component or an array of components",
                ))
            }
        };

        Ok(Self {
            kind,
            attributes,
            children,
        })
    }
}

impl TryFrom<Value> for ComponentSpec {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value_at(value, 0)
    }
}

impl From<ComponentSpec> for Value {
    fn from(spec: ComponentSpec) -> Self {
        let mut map = spec.attributes;
        map.insert(KIND_FIELD.to_string(), Value::String(spec.kind.into()));
        match spec.children {
            Children::None => {}
            Children::Text(text) => {
                map.insert(CHILDREN_FIELD.to_string(), Value::String(text));
            }
            Children::Single(child) => {
                map.insert(CHILDREN_FIELD.to_string(), Value::from(*child));
            }
            Children::Many(items) => {
                map.insert(
                    CHILDREN_FIELD.to_string(),
                    Value::Array(items.into_iter().map(Value::from).collect()),
                );
            }
        }
        Value::Object(map)
    }
}

// =============================================================================
// UI Specification
// =============================================================================

/// The top-level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UISpecification {
    pub version: String,
    pub root: ComponentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SpecificationMetadata>,
    /// Theme tokens, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateSpecification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<Vec<DataSourceSpecification>>,
    /// Top-level fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UISpecification {
    pub fn new(version: impl Into<String>, root: ComponentSpec) -> Self {
        Self {
            version: version.into(),
            root,
            metadata: None,
            theme: None,
            state: None,
            data_sources: None,
            extra: Map::new(),
        }
    }

    /// True when a raw object looks like a wrapper document rather than a bare node
    pub fn is_wrapper(value: &Value) -> bool {
        value
            .as_object()
            .map(|obj| obj.contains_key("version") || obj.contains_key("root"))
            .unwrap_or(false)
    }
}

/// Descriptive metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Initial application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpecification {
    pub initial: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kind of external data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Rest,
    Graphql,
    Static,
    Websocket,
    Function,
}

/// An external data-source declaration. Only its shape is checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceSpecification {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    pub config: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Either Document
// =============================================================================

/// A validated document of either shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Specification {
    Ui(UISpecification),
    Component(ComponentSpec),
}

impl Specification {
    pub fn as_ui(&self) -> Option<&UISpecification> {
        match self {
            Self::Ui(spec) => Some(spec),
            Self::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentSpec> {
        match self {
            Self::Component(spec) => Some(spec),
            Self::Ui(_) => None,
        }
    }

    /// The root component node
    pub fn root(&self) -> &ComponentSpec {
        match self {
            Self::Ui(spec) => &spec.root,
            Self::Component(spec) => spec,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(ComponentKind::from("Grid"), ComponentKind::Grid);
        assert_eq!(
            ComponentKind::from("Carousel"),
            ComponentKind::Other("Carousel".to_string())
        );
        assert_eq!(String::from(ComponentKind::Heading), "Heading");
        assert!(ComponentKind::SimpleGrid.is_grid_like());
        assert!(!ComponentKind::Other("Grid2".into()).is_grid_like());
    }

    #[test]
    fn test_component_conversion_is_lossless() {
        let raw = json!({
            "type": "Grid",
            "columns": 3,
            "className": "gap-4",
            "children": [
                { "type": "Box", "children": "A" },
                { "type": "Card", "children": { "type": "Text", "children": "B" } }
            ]
        });

        let spec = ComponentSpec::try_from(raw.clone()).unwrap();
        assert_eq!(spec.kind, ComponentKind::Grid);
        assert_eq!(spec.attribute("columns"), Some(&json!(3)));
        match &spec.children {
            Children::Many(items) => assert_eq!(items.len(), 2),
            other => panic!("Expected Many, got {:?}", other),
        }
        assert_eq!(spec.to_value(), raw);
    }

    #[test]
    fn test_conversion_reports_nested_path() {
        let raw = json!({
            "type": "Box",
            "children": [{ "type": "Text" }, { "children": "X" }]
        });

        let err = ComponentSpec::try_from(raw).unwrap_err();
        assert_eq!(err.path, "children.1");
        assert!(err.reason.contains("'type'"));
    }

    #[test]
    fn test_ui_specification_preserves_unknown_fields() {
        let raw = json!({
            "version": "1.0.0",
            "root": { "type": "Container", "children": "Hi" },
            "metadata": { "title": "Home", "tags": ["a"] },
            "dataSources": [{ "id": "users", "type": "rest", "config": { "url": "/u" } }],
            "x-experimental": true
        });

        let spec: UISpecification = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(spec.version, "1.0.0");
        assert_eq!(spec.data_sources.as_ref().map(Vec::len), Some(1));
        assert_eq!(spec.extra.get("x-experimental"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&spec).unwrap(), raw);
    }

    #[test]
    fn test_wrapper_detection() {
        assert!(UISpecification::is_wrapper(&json!({ "version": "1" })));
        assert!(UISpecification::is_wrapper(&json!({ "root": {} })));
        assert!(!UISpecification::is_wrapper(&json!({ "type": "Box" })));
        assert!(!UISpecification::is_wrapper(&json!("text")));
    }
}
