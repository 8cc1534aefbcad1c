//! Heuristic quality checks
//!
//! These run only on structurally valid documents and never fail validation.

use crate::workflow::WorkflowDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

pub const HARDCODED_CREDENTIALS: &str = "Potential hardcoded credentials detected";
pub const NO_ERROR_HANDLING: &str = "No error handling configured";
pub const NO_DOCUMENTATION: &str = "No documentation nodes found";

static PLACEHOLDER_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^}]*\}").expect("valid placeholder span regex"));

/// A pattern for something that looks like a secret
///
/// When the pattern has a capture group, only the group is the secret, so
/// `"password": "${DB_PASSWORD}"` counts as wrapped.
#[derive(Debug, Clone)]
pub struct SecretPattern {
    regex: Regex,
}

impl SecretPattern {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    fn secret_ranges<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.regex.captures_iter(text).filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.range())
        })
    }
}

/// Default patterns: long alphanumeric runs, e-mail addresses, password values
pub fn default_secret_patterns() -> Vec<SecretPattern> {
    [
        r"[A-Za-z0-9]{32,}",
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}",
        r#"(?i)password["\s]*:["\s]*([^"]+)"#,
    ]
    .into_iter()
    .map(|pattern| SecretPattern::new(Regex::new(pattern).expect("valid secret pattern")))
    .collect()
}

/// Byte ranges of every secret in `text` that is not inside a `${...}` placeholder
pub fn unwrapped_secrets(text: &str, patterns: &[SecretPattern]) -> Vec<Range<usize>> {
    let placeholders: Vec<Range<usize>> = PLACEHOLDER_SPAN
        .find_iter(text)
        .map(|m| m.range())
        .collect();

    patterns
        .iter()
        .flat_map(|pattern| pattern.secret_ranges(text))
        .filter(|secret| {
            !placeholders
                .iter()
                .any(|span| span.start <= secret.start && secret.end <= span.end)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct QualityChecker {
    sticky_note_type: String,
    secret_patterns: Vec<SecretPattern>,
}

impl QualityChecker {
    pub fn new(sticky_note_type: impl Into<String>) -> Self {
        Self {
            sticky_note_type: sticky_note_type.into(),
            secret_patterns: default_secret_patterns(),
        }
    }

    pub fn with_secret_patterns(mut self, patterns: Vec<SecretPattern>) -> Self {
        self.secret_patterns = patterns;
        self
    }

    /// Advisory warnings for a structurally valid document
    pub fn check(&self, document: &WorkflowDocument) -> Vec<String> {
        let mut warnings = Vec::new();

        let text = document.to_compact_string();
        if !unwrapped_secrets(&text, &self.secret_patterns).is_empty() {
            warnings.push(HARDCODED_CREDENTIALS.to_string());
        }

        if !document.has_error_handling() {
            warnings.push(NO_ERROR_HANDLING.to_string());
        }

        if document.sticky_notes(&self.sticky_note_type).next().is_none() {
            warnings.push(NO_DOCUMENTATION.to_string());
        }

        warnings
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new(crate::config::STICKY_NOTE_TYPE)
    }
}
