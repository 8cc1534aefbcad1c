//! Output file names for archived workflows
//!
//! A workflow is named after its trigger node when it has one, then after the
//! title of its first sticky note, and finally after its source identity.

use crate::workflow::WorkflowDocument;
use once_cell::sync::Lazy;
use regex::Regex;

/// Name used when nothing better can be derived
pub const UNNAMED_WORKFLOW: &str = "unnamed-workflow";

/// Longest slug `sanitize` produces
pub const MAX_NAME_LEN: usize = 50;

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid disallowed chars regex"));
static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

#[derive(Debug, Clone)]
pub struct Namer {
    sticky_note_type: String,
}

impl Namer {
    pub fn new(sticky_note_type: impl Into<String>) -> Self {
        Self {
            sticky_note_type: sticky_note_type.into(),
        }
    }

    /// Derive a filesystem-safe name for `document`
    pub fn name_for(&self, document: &WorkflowDocument, fallback: &str) -> String {
        let trigger = document.first_trigger().map(|node| node.label().to_string());
        let sticky_title = self.sticky_note_title(document);

        [trigger, sticky_title, Some(fallback.to_string())]
            .into_iter()
            .flatten()
            .map(|candidate| sanitize(&candidate))
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| UNNAMED_WORKFLOW.to_string())
    }

    /// First line of the first sticky note, without `#` or whitespace
    fn sticky_note_title(&self, document: &WorkflowDocument) -> Option<String> {
        let note = document.sticky_notes(&self.sticky_note_type).next()?;
        let content = note.parameter_str("content").unwrap_or_default();
        let title: String = content
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| *c != '#' && !c.is_whitespace())
            .collect();

        (!title.is_empty()).then_some(title)
    }
}

impl Default for Namer {
    fn default() -> Self {
        Self::new(crate::config::STICKY_NOTE_TYPE)
    }
}

/// Lowercase, keep `[a-z0-9-]`, hyphenate whitespace, cap at 50 characters
pub fn sanitize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = DISALLOWED_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUNS.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");

    // Only ASCII survives the filter above, so byte and char counts agree
    let truncated: String = collapsed.chars().take(MAX_NAME_LEN).collect();
    truncated.trim_matches('-').to_string()
}
