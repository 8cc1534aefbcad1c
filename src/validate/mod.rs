//! Workflow validation
//!
//! Validation happens in two phases. The structural phase asks a
//! [`SchemaContract`] for every violation; a document with any violation is
//! invalid. Documents that pass get a quality phase whose findings are warnings
//! only. [`ValidationSummary`] aggregates results over many files and decides
//! the exit code: any structural failure or unreadable file fails the run.

use crate::workflow::{WorkflowDocument, WorkflowParser};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub mod quality;
pub mod schema;

pub use quality::{QualityChecker, SecretPattern};
pub use schema::{JsonSchema, SchemaContract, SchemaViolation};

/// Result of validating one document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<SchemaViolation>,
    pub warnings: Vec<String>,
}

/// Result of validating one file
#[derive(Debug, Clone)]
pub enum FileValidation {
    Checked {
        path: PathBuf,
        outcome: ValidationOutcome,
    },
    /// The file could not be read or parsed
    Unreadable { path: PathBuf, error: String },
}

impl FileValidation {
    pub fn path(&self) -> &Path {
        match self {
            FileValidation::Checked { path, .. } | FileValidation::Unreadable { path, .. } => path,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FileValidation::Checked { outcome, .. } if outcome.valid)
    }
}

/// A file that failed validation and why
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub errors: Vec<String>,
}

/// Aggregate over a batch of files
#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    pub valid: usize,
    pub invalid: usize,
    pub warnings: Vec<(PathBuf, Vec<String>)>,
    pub failures: Vec<FileFailure>,
}

impl ValidationSummary {
    pub fn record(&mut self, result: FileValidation) {
        match result {
            FileValidation::Checked { path, outcome } => {
                if outcome.valid {
                    self.valid += 1;
                    if !outcome.warnings.is_empty() {
                        self.warnings.push((path, outcome.warnings));
                    }
                } else {
                    self.invalid += 1;
                    self.failures.push(FileFailure {
                        path,
                        errors: outcome.errors.iter().map(ToString::to_string).collect(),
                    });
                }
            }
            FileValidation::Unreadable { path, error } => {
                self.invalid += 1;
                self.failures.push(FileFailure {
                    path,
                    errors: vec![error],
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }

    pub fn files_with_warnings(&self) -> usize {
        self.warnings.len()
    }

    /// Warnings never fail a run
    pub fn passed(&self) -> bool {
        self.invalid == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

pub struct Validator {
    schema: Box<dyn SchemaContract>,
    quality: QualityChecker,
}

impl Validator {
    pub fn new(schema: impl SchemaContract + 'static, quality: QualityChecker) -> Self {
        Self {
            schema: Box::new(schema),
            quality,
        }
    }

    pub fn validate(&self, document: &WorkflowDocument) -> ValidationOutcome {
        let errors = self.schema.check(document.as_value());
        if !errors.is_empty() {
            return ValidationOutcome {
                valid: false,
                errors,
                warnings: Vec::new(),
            };
        }

        ValidationOutcome {
            valid: true,
            errors,
            warnings: self.quality.check(document),
        }
    }

    pub fn validate_file(&self, path: &Path) -> FileValidation {
        match WorkflowParser::new().parse_file(path) {
            Ok(document) => {
                let outcome = self.validate(&document);
                if outcome.valid {
                    debug!("✓ {}", path.display());
                } else {
                    warn!("✗ {} ({} violations)", path.display(), outcome.errors.len());
                }
                FileValidation::Checked {
                    path: path.to_path_buf(),
                    outcome,
                }
            }
            Err(e) => {
                warn!("✗ {} ({})", path.display(), e);
                FileValidation::Unreadable {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Validate every `*.json` file under each path, files in name order
    pub fn validate_paths<P: AsRef<Path>>(&self, paths: &[P]) -> (Vec<FileValidation>, ValidationSummary) {
        let files = collect_json_files(paths);
        info!("Validating {} workflow files", files.len());

        let mut results = Vec::with_capacity(files.len());
        let mut summary = ValidationSummary::default();
        for file in files {
            let result = self.validate_file(&file);
            results.push(result.clone());
            summary.record(result);
        }

        (results, summary)
    }
}

/// Every `*.json` file under the given files or directories
pub fn collect_json_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in paths {
        for entry in WalkDir::new(root.as_ref()).sort_by_file_name() {
            match entry {
                Ok(entry)
                    if entry.file_type().is_file()
                        && entry.path().extension().and_then(|e| e.to_str()) == Some("json") =>
                {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
    }

    files
}
