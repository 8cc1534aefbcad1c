use crate::workflow::{WorkflowDocument, WorkflowParser};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};

/// A workflow file found on disk
///
/// The identity is the file stem, so `old/a.json` and `new/a.json` are two
/// copies of the same workflow. Content is parsed on first access.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub identity: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    /// Position in the scan, used to break modification-time ties
    pub discovery_index: usize,
    content: OnceCell<WorkflowDocument>,
}

impl FileEntry {
    pub fn new(
        identity: impl Into<String>,
        path: impl Into<PathBuf>,
        modified: DateTime<Utc>,
        discovery_index: usize,
    ) -> Self {
        Self {
            identity: identity.into(),
            path: path.into(),
            modified,
            discovery_index,
            content: OnceCell::new(),
        }
    }

    /// Stat `path` and derive its identity from the file stem
    pub fn from_path(path: &Path, discovery_index: usize) -> Result<Self> {
        let identity = identity_of(path).ok_or_else(|| {
            Error::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file stem"),
            )
        })?;
        let modified = path
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|e| Error::filesystem(path, e))?;

        Ok(Self::new(
            identity,
            path,
            DateTime::<Utc>::from(modified),
            discovery_index,
        ))
    }

    /// Parsed document, read from disk the first time it is asked for
    pub fn content(&self) -> Result<&WorkflowDocument> {
        self.content
            .get_or_try_init(|| WorkflowParser::new().parse_file(&self.path))
    }

    pub fn is_loaded(&self) -> bool {
        self.content.get().is_some()
    }
}

/// Logical identity of a workflow file: its name without the extension
pub fn identity_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_identity_from_stem() {
        assert_eq!(
            identity_of(Path::new("/tmp/2025/07/abc123.json")).as_deref(),
            Some("abc123")
        );
        assert_eq!(identity_of(Path::new("/")), None);
    }

    #[test]
    fn test_content_is_lazy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow.json");
        fs::write(&path, r#"{"nodes": [], "connections": {}}"#).unwrap();

        let entry = FileEntry::from_path(&path, 0).unwrap();
        assert_eq!(entry.identity, "flow");
        assert!(!entry.is_loaded());

        assert_eq!(entry.content().unwrap().node_count(), 0);
        assert!(entry.is_loaded());
    }

    #[test]
    fn test_content_reports_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let entry = FileEntry::from_path(&path, 0).unwrap();
        assert!(matches!(
            entry.content(),
            Err(Error::MalformedInput { .. })
        ));
    }
}
