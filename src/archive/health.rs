//! Archive health check
//!
//! Inspects an organized archive and reports one [`CheckResult`] per finding.
//! Missing category directories and an empty archive fail the check; empty
//! categories, undocumented workflows and unwrapped secrets only warn.

use crate::config::ArchiveConfig;
use crate::validate::quality::{unwrapped_secrets, SecretPattern};
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CheckStatus::Pass => "✓",
            CheckStatus::Fail => "✗",
            CheckStatus::Warn => "⚠",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    pub checks: Vec<CheckResult>,
    pub total_workflows: usize,
}

impl HealthReport {
    fn push(&mut self, status: CheckStatus, message: impl Into<String>) {
        let check = CheckResult::new(status, message);
        match check.status {
            CheckStatus::Pass => debug!("{}", check),
            CheckStatus::Fail | CheckStatus::Warn => warn!("{}", check),
        }
        self.checks.push(check);
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warnings(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    /// Percentage of checks that passed outright
    pub fn success_rate(&self) -> f64 {
        if self.checks.is_empty() {
            return 0.0;
        }
        self.passed() as f64 / self.checks.len() as f64 * 100.0
    }

    /// Healthy means nothing failed; warnings are allowed
    pub fn is_healthy(&self) -> bool {
        self.failed() == 0
    }
}

pub struct HealthChecker {
    categories: Vec<String>,
    secret_patterns: Vec<SecretPattern>,
}

impl HealthChecker {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            categories: config.category_names().map(str::to_string).collect(),
            secret_patterns: archive_secret_patterns(),
        }
    }

    pub fn check(&self, archive: &Path) -> Result<HealthReport> {
        if !archive.is_dir() {
            return Err(Error::filesystem(
                archive,
                std::io::Error::new(std::io::ErrorKind::NotFound, "archive directory not found"),
            ));
        }

        info!("Checking archive health at {}", archive.display());
        let mut report = HealthReport::default();

        for category in &self.categories {
            let dir = archive.join(category);
            if !dir.is_dir() {
                report.push(
                    CheckStatus::Fail,
                    format!("Category directory missing: {category}"),
                );
                continue;
            }
            report.push(
                CheckStatus::Pass,
                format!("Category directory exists: {category}"),
            );

            let workflows = workflow_files(&dir);
            if workflows.is_empty() {
                report.push(
                    CheckStatus::Warn,
                    format!("Category {category} contains no workflows"),
                );
            } else {
                report.push(
                    CheckStatus::Pass,
                    format!("Category {category} contains {} workflows", workflows.len()),
                );
            }
            report.total_workflows += workflows.len();

            for workflow in &workflows {
                self.check_workflow(category, workflow, &mut report);
            }
        }

        if report.total_workflows == 0 {
            report.push(CheckStatus::Fail, "Archive contains no workflows");
        } else {
            report.push(
                CheckStatus::Pass,
                format!("Archive contains {} workflows", report.total_workflows),
            );
        }

        Ok(report)
    }

    fn check_workflow(&self, category: &str, path: &Path, report: &mut HealthReport) {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = format!("{category}/{file_name}");

        if !path.with_extension("md").is_file() {
            report.push(CheckStatus::Warn, format!("Missing documentation: {label}"));
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let secrets = unwrapped_secrets(&content, &self.secret_patterns);
                if !secrets.is_empty() {
                    report.push(
                        CheckStatus::Warn,
                        format!("Potential unredacted secrets in {label} ({})", secrets.len()),
                    );
                }
            }
            Err(e) => report.push(CheckStatus::Warn, format!("Unreadable workflow {label}: {e}")),
        }
    }
}

/// Long alphanumeric runs, OpenAI-style keys and Slack bot tokens
pub fn archive_secret_patterns() -> Vec<SecretPattern> {
    [
        r"[A-Za-z0-9]{32,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"xoxb-[A-Za-z0-9-]+",
    ]
    .into_iter()
    .map(|pattern| SecretPattern::new(Regex::new(pattern).expect("valid archive secret pattern")))
    .collect()
}

/// `*.json` files directly inside a category directory, in name order
fn workflow_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some("json")
        })
        .map(|entry| entry.into_path())
        .collect()
}
