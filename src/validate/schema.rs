//! Structural schema checks
//!
//! The validator only relies on [`SchemaContract`]: hand it a document, get back
//! every violation. [`JsonSchema`] implements the contract for the JSON Schema
//! keywords workflow schemas use (`type`, `required`, `properties`,
//! `additionalProperties`, `items`, `minItems`, `maxItems`, `minLength`,
//! `maxLength`, `pattern`, `enum`, `const`, `minimum`, `maximum`, `anyOf`) plus
//! annotations such as `title` and `description`. A schema using any other
//! keyword is rejected with [`Error::SchemaContract`].

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Keywords [`JsonSchema`] enforces
const VALIDATION_KEYWORDS: &[&str] = &[
    "type",
    "enum",
    "const",
    "minLength",
    "maxLength",
    "pattern",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "items",
    "required",
    "properties",
    "additionalProperties",
    "anyOf",
];

/// Keywords that carry no validation meaning
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
];

/// Workflow schema shipped with the crate
pub const BUNDLED_WORKFLOW_SCHEMA: &str = include_str!("../../schema/workflow-schema.json");

/// A single structural problem, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// Instance path, empty for the document root
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Anything that can decide whether a document is structurally valid
pub trait SchemaContract {
    /// Every violation in `document`; empty means it conforms
    fn check(&self, document: &Value) -> Vec<SchemaViolation>;
}

/// A compiled JSON Schema document
#[derive(Debug, Clone)]
pub struct JsonSchema {
    root: Value,
    patterns: HashMap<String, Regex>,
}

impl JsonSchema {
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() && !root.is_boolean() {
            return Err(Error::SchemaContract(
                "schema must be an object or a boolean".to_string(),
            ));
        }

        let mut patterns = HashMap::new();
        compile_schema(&root, &mut patterns)?;
        Ok(Self { root, patterns })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| Error::SchemaContract(format!("schema is not valid JSON: {e}")))?;
        Self::from_value(root)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::SchemaContract(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// The bundled n8n workflow schema
    pub fn workflow() -> Result<Self> {
        Self::parse(BUNDLED_WORKFLOW_SCHEMA)
    }

    fn check_node(&self, schema: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
        let schema = match schema {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(SchemaViolation::new(path, "boolean schema is false"));
                return;
            }
            Value::Object(schema) => schema,
            _ => return,
        };

        if let Some(expected) = schema.get("type") {
            if !matches_type(expected, instance) {
                out.push(SchemaViolation::new(
                    path,
                    format!("must be {}", describe_type(expected)),
                ));
                return;
            }
        }

        if let Some(Value::Array(allowed)) = schema.get("enum") {
            if !allowed.contains(instance) {
                out.push(SchemaViolation::new(
                    path,
                    "must be equal to one of the allowed values",
                ));
            }
        }

        if let Some(constant) = schema.get("const") {
            if constant != instance {
                out.push(SchemaViolation::new(path, "must be equal to constant"));
            }
        }

        match instance {
            Value::String(text) => self.check_string(schema, text, path, out),
            Value::Number(_) => check_number(schema, instance, path, out),
            Value::Array(items) => self.check_array(schema, items, path, out),
            Value::Object(map) => self.check_object(schema, map, path, out),
            _ => {}
        }

        if let Some(Value::Array(branches)) = schema.get("anyOf") {
            let matched = branches.iter().any(|branch| {
                let mut scratch = Vec::new();
                self.check_node(branch, instance, path, &mut scratch);
                scratch.is_empty()
            });
            if !matched {
                out.push(SchemaViolation::new(path, "must match a schema in anyOf"));
            }
        }
    }

    fn check_string(
        &self,
        schema: &Map<String, Value>,
        text: &str,
        path: &str,
        out: &mut Vec<SchemaViolation>,
    ) {
        let length = text.chars().count() as u64;

        if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
            if length < min {
                out.push(SchemaViolation::new(
                    path,
                    format!("must NOT have fewer than {min} characters"),
                ));
            }
        }

        if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                out.push(SchemaViolation::new(
                    path,
                    format!("must NOT have more than {max} characters"),
                ));
            }
        }

        if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
            if let Some(regex) = self.patterns.get(pattern) {
                if !regex.is_match(text) {
                    out.push(SchemaViolation::new(
                        path,
                        format!("must match pattern \"{pattern}\""),
                    ));
                }
            }
        }
    }

    fn check_array(
        &self,
        schema: &Map<String, Value>,
        items: &[Value],
        path: &str,
        out: &mut Vec<SchemaViolation>,
    ) {
        let count = items.len() as u64;

        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if count < min {
                out.push(SchemaViolation::new(
                    path,
                    format!("must NOT have fewer than {min} items"),
                ));
            }
        }

        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
            if count > max {
                out.push(SchemaViolation::new(
                    path,
                    format!("must NOT have more than {max} items"),
                ));
            }
        }

        match schema.get("items") {
            Some(Value::Array(tuple)) => {
                for (index, (item, item_schema)) in items.iter().zip(tuple).enumerate() {
                    self.check_node(item_schema, item, &format!("{path}/{index}"), out);
                }
            }
            Some(item_schema) => {
                for (index, item) in items.iter().enumerate() {
                    self.check_node(item_schema, item, &format!("{path}/{index}"), out);
                }
            }
            None => {}
        }
    }

    fn check_object(
        &self,
        schema: &Map<String, Value>,
        map: &Map<String, Value>,
        path: &str,
        out: &mut Vec<SchemaViolation>,
    ) {
        if let Some(Value::Array(required)) = schema.get("required") {
            for key in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(key) {
                    out.push(SchemaViolation::new(
                        path,
                        format!("must have required property '{key}'"),
                    ));
                }
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        for (key, value) in map {
            let child_path = format!("{path}/{}", escape_pointer(key));
            match properties.and_then(|p| p.get(key)) {
                Some(property_schema) => self.check_node(property_schema, value, &child_path, out),
                None => match schema.get("additionalProperties") {
                    Some(Value::Bool(false)) => out.push(SchemaViolation::new(
                        path,
                        format!("must NOT have additional properties ('{key}')"),
                    )),
                    Some(extra) => self.check_node(extra, value, &child_path, out),
                    None => {}
                },
            }
        }
    }
}

impl SchemaContract for JsonSchema {
    fn check(&self, document: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        self.check_node(&self.root, document, "", &mut violations);
        violations
    }
}

fn check_number(
    schema: &Map<String, Value>,
    instance: &Value,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    let Some(number) = instance.as_f64() else {
        return;
    };

    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if number < min {
            out.push(SchemaViolation::new(path, format!("must be >= {min}")));
        }
    }

    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if number > max {
            out.push(SchemaViolation::new(path, format!("must be <= {max}")));
        }
    }
}

fn matches_type(expected: &Value, instance: &Value) -> bool {
    match expected {
        Value::String(name) => matches_type_name(name, instance),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type_name(name, instance)),
        _ => true,
    }
}

fn matches_type_name(name: &str, instance: &Value) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => {
            instance.is_i64()
                || instance.is_u64()
                || instance.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        other => other.as_str().unwrap_or("valid").to_string(),
    }
}

/// Escape a key for use as a JSON pointer segment
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Walk every subschema, rejecting unsupported keywords and compiling patterns
fn compile_schema(schema: &Value, patterns: &mut HashMap<String, Regex>) -> Result<()> {
    let mut stack = vec![(schema, String::from("#"))];

    while let Some((current, location)) = stack.pop() {
        let map = match current {
            Value::Object(map) => map,
            Value::Bool(_) => continue,
            _ => {
                return Err(Error::SchemaContract(format!(
                    "{location}: schema must be an object or a boolean"
                )))
            }
        };

        for (keyword, value) in map {
            let at = format!("{location}/{}", escape_pointer(keyword));
            match keyword.as_str() {
                "pattern" => {
                    let pattern = value.as_str().ok_or_else(|| {
                        Error::SchemaContract(format!("{at}: pattern must be a string"))
                    })?;
                    if !patterns.contains_key(pattern) {
                        let regex = Regex::new(pattern).map_err(|e| {
                            Error::SchemaContract(format!("invalid pattern \"{pattern}\": {e}"))
                        })?;
                        patterns.insert(pattern.to_string(), regex);
                    }
                }
                "properties" => {
                    let properties = value.as_object().ok_or_else(|| {
                        Error::SchemaContract(format!("{at}: properties must be an object"))
                    })?;
                    for (name, subschema) in properties {
                        stack.push((subschema, format!("{at}/{}", escape_pointer(name))));
                    }
                }
                "anyOf" => {
                    let branches = value.as_array().ok_or_else(|| {
                        Error::SchemaContract(format!("{at}: anyOf must be an array"))
                    })?;
                    for (index, branch) in branches.iter().enumerate() {
                        stack.push((branch, format!("{at}/{index}")));
                    }
                }
                "items" => match value {
                    Value::Array(tuple) => {
                        for (index, item) in tuple.iter().enumerate() {
                            stack.push((item, format!("{at}/{index}")));
                        }
                    }
                    item => stack.push((item, at)),
                },
                "additionalProperties" => stack.push((value, at)),
                known
                    if VALIDATION_KEYWORDS.contains(&known)
                        || ANNOTATION_KEYWORDS.contains(&known) => {}
                unsupported => {
                    return Err(Error::SchemaContract(format!(
                        "unsupported keyword '{unsupported}' at {location}"
                    )))
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_node() -> Value {
        json!({
            "id": "12345678-1234-1234-1234-123456789012",
            "name": "Test Node",
            "type": "n8n-nodes-base.httpRequest",
            "typeVersion": 1,
            "position": [100, 200],
            "parameters": {}
        })
    }

    #[test]
    fn test_bundled_schema_accepts_minimal_workflow() {
        let schema = JsonSchema::workflow().unwrap();
        let doc = json!({ "nodes": [minimal_node()], "connections": {} });
        assert_eq!(schema.check(&doc), vec![]);
    }

    #[test]
    fn test_bundled_schema_accepts_scoped_node_type() {
        let schema = JsonSchema::workflow().unwrap();
        let mut node = minimal_node();
        node["type"] = json!("@n8n/n8n-nodes-langchain.openAi");
        let doc = json!({ "nodes": [node], "connections": {} });
        assert!(schema.check(&doc).is_empty());
    }

    #[test]
    fn test_missing_nodes_is_reported() {
        let schema = JsonSchema::workflow().unwrap();
        let violations = schema.check(&json!({ "connections": {} }));
        assert_eq!(
            violations,
            vec![SchemaViolation::new("", "must have required property 'nodes'")]
        );
    }

    #[test]
    fn test_reports_every_violation() {
        let schema = JsonSchema::workflow().unwrap();
        let doc = json!({
            "nodes": [{
                "id": "not-a-uuid",
                "name": "",
                "type": "nodots",
                "typeVersion": "1",
                "position": [1],
                "parameters": {}
            }],
            "connections": []
        });

        let paths: Vec<_> = schema.check(&doc).into_iter().map(|v| v.path).collect();
        assert_eq!(
            paths,
            vec![
                "/nodes/0/id",
                "/nodes/0/name",
                "/nodes/0/type",
                "/nodes/0/typeVersion",
                "/nodes/0/position",
                "/connections",
            ]
        );
    }

    #[test]
    fn test_additional_properties_and_any_of() {
        let schema = JsonSchema::from_value(json!({
            "type": "object",
            "properties": {
                "value": { "anyOf": [{ "type": "string" }, { "type": "integer" }] }
            },
            "additionalProperties": false
        }))
        .unwrap();

        assert!(schema.check(&json!({ "value": 3 })).is_empty());
        let violations = schema.check(&json!({ "value": 1.5, "extra/key": true }));
        assert_eq!(
            violations,
            vec![
                SchemaViolation::new("/value", "must match a schema in anyOf"),
                SchemaViolation::new("", "must NOT have additional properties ('extra/key')"),
            ]
        );
    }

    #[test]
    fn test_enum_const_and_bounds() {
        let schema = JsonSchema::from_value(json!({
            "type": "array",
            "items": [
                { "enum": ["a", "b"] },
                { "const": 7 },
                { "type": "number", "minimum": 0, "maximum": 10 }
            ]
        }))
        .unwrap();

        let violations = schema.check(&json!(["c", 8, 11]));
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[2], SchemaViolation::new("/2", "must be <= 10"));
    }

    #[test]
    fn test_invalid_schema_is_fatal() {
        assert!(matches!(
            JsonSchema::parse("{ not json"),
            Err(Error::SchemaContract(_))
        ));
        assert!(matches!(
            JsonSchema::from_value(json!({ "pattern": "(" })),
            Err(Error::SchemaContract(_))
        ));
        assert!(matches!(
            JsonSchema::from_file(Path::new("/definitely/missing/schema.json")),
            Err(Error::SchemaContract(_))
        ));
        assert!(JsonSchema::from_value(json!(42)).is_err());
    }

    #[test]
    fn test_unsupported_keywords_are_rejected() {
        let nested_all_of = json!({
            "allOf": [{ "type": "object", "required": ["nodes", "connections"] }]
        });
        let err = JsonSchema::from_value(nested_all_of).unwrap_err();
        assert!(matches!(err, Error::SchemaContract(_)));
        assert!(err.to_string().contains("'allOf'"));

        for keyword in ["oneOf", "not", "$ref", "format", "dependencies"] {
            let mut inner = Map::new();
            inner.insert(keyword.to_string(), json!("x"));
            let schema = json!({
                "type": "object",
                "properties": { "nodes": { "items": Value::Object(inner) } }
            });
            let err = JsonSchema::from_value(schema).unwrap_err();
            assert!(
                err.to_string().contains("#/properties/nodes/items"),
                "keyword {keyword}: {err}"
            );
        }
    }

    #[test]
    fn test_property_names_are_not_keywords() {
        let schema = JsonSchema::from_value(json!({
            "title": "names that look like keywords",
            "properties": {
                "allOf": { "type": "string" },
                "format": { "type": "string", "description": "plain field" }
            }
        }))
        .unwrap();
        assert!(schema.check(&json!({ "allOf": "x", "format": "y" })).is_empty());
        assert_eq!(schema.check(&json!({ "format": 1 })).len(), 1);
    }
}
