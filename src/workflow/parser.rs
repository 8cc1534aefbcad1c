use super::WorkflowDocument;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Reads workflow documents from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowParser;

impl WorkflowParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowDocument> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::filesystem(path, e))?;

        serde_json::from_str(&content).map_err(|e| Error::malformed(path, e))
    }

    pub fn parse_str(&self, content: &str) -> Result<WorkflowDocument> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Write a document as pretty JSON with two-space indentation
pub fn write_document(path: &Path, document: &WorkflowDocument) -> Result<()> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    fs::write(path, text).map_err(|e| Error::filesystem(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow.json");
        let doc = WorkflowDocument::new(json!({ "nodes": [], "connections": {} }));

        write_document(&path, &doc).unwrap();
        let parsed = WorkflowParser::new().parse_file(&path).unwrap();
        assert_eq!(parsed, doc);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"nodes\""));
    }

    #[test]
    fn test_parse_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ \"nodes\": [").unwrap();

        let err = WorkflowParser::new().parse_file(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_parse_str() {
        let parser = WorkflowParser::new();
        let doc = parser
            .parse_str(r#"{"nodes": [{"name": "A"}], "connections": {}}"#)
            .unwrap();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.into_value()["connections"], json!({}));

        assert!(matches!(
            parser.parse_str("[1, 2"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = WorkflowParser::new()
            .parse_file("/definitely/not/here.json")
            .unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
