use super::docs::WorkflowSummary;
use crate::categorize::Categorizer;
use crate::config::ArchiveConfig;
use crate::dedupe::{Deduplicator, FileEntry};
use crate::naming::Namer;
use crate::redact::Redactor;
use crate::workflow::parser::write_document;
use crate::workflow::WorkflowDocument;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One workflow written to the archive
#[derive(Debug, Clone)]
pub struct OrganizedWorkflow {
    pub identity: String,
    pub source: PathBuf,
    pub category: String,
    pub name: String,
    pub json_path: PathBuf,
    pub doc_path: PathBuf,
}

/// A source file the organizer could not process
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeReport {
    pub organized: Vec<OrganizedWorkflow>,
    pub skipped: Vec<SkippedFile>,
    /// Source files set aside because a newer copy with the same identity exists
    pub duplicates_collapsed: usize,
}

impl OrganizeReport {
    /// Number of archived workflows per category
    pub fn by_category(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for workflow in &self.organized {
            *counts.entry(workflow.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Turns a directory of raw exports into `<output>/<category>/<name>.{json,md}`
///
/// Source files are never modified. Only the newest copy of each identity is
/// archived; older copies are counted but left alone.
pub struct Organizer {
    config: ArchiveConfig,
    categorizer: Categorizer,
    redactor: Redactor,
    namer: Namer,
    output: PathBuf,
}

impl Organizer {
    pub fn new(config: ArchiveConfig, output: impl Into<PathBuf>) -> Result<Self> {
        let categorizer = Categorizer::from_config(&config)?;
        let redactor = Redactor::new(config.credentials.clone())?;
        let namer = Namer::new(config.sticky_note_type.clone());

        Ok(Self {
            config,
            categorizer,
            redactor,
            namer,
            output: output.into(),
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn organize(&self, source: &Path) -> Result<OrganizeReport> {
        let entries = Deduplicator::new(source).scan()?;
        let total = entries.len();
        let mut report = OrganizeReport::default();

        // Unreadable copies never compete for survivor, so an older valid copy wins
        let mut readable = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.content() {
                Ok(_) => readable.push(entry),
                Err(e) => {
                    warn!("Skipping invalid file: {} - {}", entry.path.display(), e);
                    report.skipped.push(SkippedFile {
                        path: entry.path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let readable_count = readable.len();
        let unique = Deduplicator::resolve_unique(readable);
        report.duplicates_collapsed = readable_count - unique.len();

        info!(
            "Found {} unique workflows in {} files under {}",
            unique.len(),
            total,
            source.display()
        );

        let mut claimed = HashSet::new();

        for entry in &unique {
            match self.process_entry(entry, &mut claimed) {
                Ok(workflow) => {
                    info!("✓ {}/{}.json", workflow.category, workflow.name);
                    report.organized.push(workflow);
                }
                Err(e) => {
                    warn!("Skipping invalid file: {} - {}", entry.path.display(), e);
                    report.skipped.push(SkippedFile {
                        path: entry.path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Categorize, scrub, name and write a single workflow
    ///
    /// `claimed` holds the target paths already written in this run; a second
    /// workflow resolving to the same path gets a numeric suffix.
    pub fn process_entry(
        &self,
        entry: &FileEntry,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<OrganizedWorkflow> {
        let document = entry.content()?;

        let category = self.categorizer.categorize(document);
        let cleaned = WorkflowDocument::new(self.redactor.redact(document.as_value()));
        let base_name = self.namer.name_for(&cleaned, &entry.identity);

        let target_dir = self.output.join(&category);
        fs::create_dir_all(&target_dir).map_err(|e| Error::filesystem(&target_dir, e))?;

        let name = claim_name(&target_dir, &base_name, claimed);
        if name != base_name {
            warn!(
                "Name collision for {}/{}, writing {} as {}",
                category,
                base_name,
                entry.path.display(),
                name
            );
        }

        let json_path = target_dir.join(format!("{name}.json"));
        write_document(&json_path, &cleaned)?;

        let description = self
            .config
            .category(&category)
            .map(|rule| rule.description.as_str())
            .unwrap_or_default();
        let summary =
            WorkflowSummary::from_document(&cleaned, &name, &category, description, &entry.identity);
        let doc_path = target_dir.join(format!("{name}.md"));
        fs::write(&doc_path, summary.to_markdown()).map_err(|e| Error::filesystem(&doc_path, e))?;

        debug!(
            "{} -> {} ({} placeholders)",
            entry.path.display(),
            json_path.display(),
            summary.placeholders.len()
        );

        Ok(OrganizedWorkflow {
            identity: entry.identity.clone(),
            source: entry.path.clone(),
            category,
            name,
            json_path,
            doc_path,
        })
    }
}

/// First free name among `base`, `base-2`, `base-3`, ... in `dir`
fn claim_name(dir: &Path, base: &str, claimed: &mut HashSet<PathBuf>) -> String {
    let mut name = base.to_string();
    let mut counter = 2;
    while !claimed.insert(dir.join(&name)) {
        name = format!("{base}-{counter}");
        counter += 1;
    }
    name
}
