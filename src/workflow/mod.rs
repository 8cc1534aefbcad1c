//! Workflow documents
//!
//! Workflow files come from exports of varying age and quality, so the document
//! is kept as a raw JSON value. [`NodeView`] gives typed, forgiving access to the
//! node fields the organizer and validator look at: a missing or mistyped field
//! simply reads as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod parser;

pub use parser::WorkflowParser;

/// An n8n-style workflow: a JSON object with `nodes` and `connections`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDocument(Value);

impl WorkflowDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Iterate over the object entries of `nodes`, skipping non-objects
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> {
        self.0
            .get("nodes")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|node| node.as_object().map(NodeView))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// First node that looks like it starts a run
    pub fn first_trigger(&self) -> Option<NodeView<'_>> {
        self.nodes().find(NodeView::is_trigger)
    }

    pub fn sticky_notes<'a>(&'a self, sticky_type: &'a str) -> impl Iterator<Item = NodeView<'a>> {
        self.nodes().filter(move |node| node.node_type() == Some(sticky_type))
    }

    /// True when at least one node opts into `continueOnFail` or `onError`
    pub fn has_error_handling(&self) -> bool {
        self.nodes().any(|node| node.handles_errors())
    }

    /// Compact JSON text, keys in document order
    pub fn to_compact_string(&self) -> String {
        self.0.to_string()
    }
}

impl From<Value> for WorkflowDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Borrowed view over a single node object
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a>(&'a Map<String, Value>);

impl<'a> NodeView<'a> {
    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&'a str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&'a str> {
        self.str_field("name")
    }

    pub fn node_type(&self) -> Option<&'a str> {
        self.str_field("type")
    }

    pub fn type_version(&self) -> Option<f64> {
        self.0.get("typeVersion").and_then(Value::as_f64)
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match self.0.get("position").and_then(Value::as_array)?.as_slice() {
            [x, y] => Some((x.as_f64()?, y.as_f64()?)),
            _ => None,
        }
    }

    pub fn parameters(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("parameters").and_then(Value::as_object)
    }

    pub fn parameter_str(&self, key: &str) -> Option<&'a str> {
        self.parameters()?.get(key).and_then(Value::as_str)
    }

    /// `type` contains "trigger", ignoring case
    pub fn type_is_trigger(&self) -> bool {
        self.node_type().is_some_and(contains_trigger)
    }

    /// `type` or `name` contains "trigger", ignoring case
    pub fn is_trigger(&self) -> bool {
        self.type_is_trigger() || self.name().is_some_and(contains_trigger)
    }

    pub fn handles_errors(&self) -> bool {
        self.0.get("continueOnFail").is_some_and(is_truthy)
            || self.0.get("onError").is_some_and(is_truthy)
    }

    /// Display label: the name, or the type for unnamed nodes
    pub fn label(&self) -> &'a str {
        match self.name() {
            Some(name) if !name.is_empty() => name,
            _ => self.node_type().unwrap_or_default(),
        }
    }
}

fn contains_trigger(text: &str) -> bool {
    text.to_lowercase().contains("trigger")
}

/// JavaScript-style truthiness, which is how exports encode these flags
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WorkflowDocument {
        WorkflowDocument::new(json!({
            "nodes": [
                {
                    "id": "12345678-1234-1234-1234-123456789012",
                    "name": "Every Morning",
                    "type": "n8n-nodes-base.scheduleTrigger",
                    "typeVersion": 1.2,
                    "position": [100, 200],
                    "parameters": {}
                },
                "not a node",
                {
                    "name": "Notes",
                    "type": "n8n-nodes-base.stickyNote",
                    "parameters": { "content": "# Daily report" },
                    "onError": "continueRegularOutput"
                }
            ],
            "connections": {}
        }))
    }

    #[test]
    fn test_nodes_skip_non_objects() {
        assert_eq!(sample().node_count(), 2);
    }

    #[test]
    fn test_node_accessors() {
        let doc = sample();
        let node = doc.nodes().next().unwrap();
        assert_eq!(node.id(), Some("12345678-1234-1234-1234-123456789012"));
        assert_eq!(node.type_version(), Some(1.2));
        assert_eq!(node.position(), Some((100.0, 200.0)));
        assert!(node.parameters().unwrap().is_empty());
    }

    #[test]
    fn test_trigger_detection_ignores_case() {
        let doc = sample();
        let trigger = doc.first_trigger().unwrap();
        assert_eq!(trigger.name(), Some("Every Morning"));
        assert!(trigger.type_is_trigger());
    }

    #[test]
    fn test_sticky_notes_and_error_handling() {
        let doc = sample();
        let notes: Vec<_> = doc.sticky_notes("n8n-nodes-base.stickyNote").collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].parameter_str("content"), Some("# Daily report"));
        assert!(doc.has_error_handling());
    }

    #[test]
    fn test_missing_nodes_reads_as_empty() {
        let doc = WorkflowDocument::new(json!({ "connections": {} }));
        assert_eq!(doc.node_count(), 0);
        assert!(!doc.has_error_handling());
        assert!(doc.first_trigger().is_none());
    }

    #[test]
    fn test_falsy_error_flags() {
        let doc = WorkflowDocument::new(json!({
            "nodes": [{ "continueOnFail": false, "onError": "" }]
        }));
        assert!(!doc.has_error_handling());
    }
}
