//! Archive configuration
//!
//! Category rules, credential mappings and the node types the organizer cares
//! about. Everything here is plain data handed to the components that need it,
//! so tests can swap in fixture categories or mappings.

use serde::{Deserialize, Serialize};

pub mod loader;
pub mod validator;

pub use loader::load_config;
pub use validator::ConfigValidator;

/// Node type used by n8n for embedded documentation notes
pub const STICKY_NOTE_TYPE: &str = "n8n-nodes-base.stickyNote";

/// Category used when no keyword of any category matches
pub const DEFAULT_CATEGORY: &str = "automation";

/// A named bucket workflows are sorted into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, keywords: &[&str], description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: description.into(),
        }
    }
}

/// One literal secret and the placeholder that replaces it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRule {
    pub value: String,
    pub placeholder: String,
}

/// Ordered table of literal secrets to scrub from workflow documents
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMapping(Vec<CredentialRule>);

impl CredentialMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, keeping insertion order
    pub fn with(mut self, value: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.0.push(CredentialRule {
            value: value.into(),
            placeholder: placeholder.into(),
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for CredentialMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(value, placeholder)| CredentialRule { value, placeholder })
                .collect(),
        )
    }
}

/// Everything the organizer needs to know about categories and secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Category returned when every score is zero
    pub default_category: String,
    /// Node type treated as a documentation note
    pub sticky_note_type: String,
    /// Categories in tie-break order
    pub categories: Vec<CategoryRule>,
    pub credentials: CredentialMapping,
}

impl ArchiveConfig {
    /// Read and validate a TOML configuration file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        load_config(Some(path))
    }

    pub fn validate(&self) -> crate::Result<()> {
        ConfigValidator::validate(self)
    }

    /// Look up a category rule by name
    pub fn category(&self, name: &str) -> Option<&CategoryRule> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            sticky_note_type: STICKY_NOTE_TYPE.to_string(),
            categories: default_categories(),
            credentials: default_credentials(),
        }
    }
}

/// The built-in category set, in tie-break order
pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "alerts",
            &[
                "telegram",
                "notification",
                "alert",
                "monitor",
                "cron",
                "price",
                "threshold",
            ],
            "Alert and notification workflows",
        ),
        CategoryRule::new(
            "analytics",
            &["openai", "analysis", "ai", "news", "data", "growth", "report"],
            "Data analysis and reporting workflows",
        ),
        CategoryRule::new(
            "automation",
            &["http", "api", "schedule", "trigger", "webhook", "integration"],
            "System automation and integration workflows",
        ),
        CategoryRule::new(
            "backup",
            &["backup", "github", "n8n", "workflow", "export", "sync"],
            "Backup and recovery workflows",
        ),
    ]
}

pub fn default_credentials() -> CredentialMapping {
    CredentialMapping::new()
        .with("PKU0NRQDJV8J14GKYDGO", "${ALPACA_API_KEY_ID}")
        .with(
            "38LahGNwNJa0yq6RFy8OxXv3VgS1gYGzxR3gYCiv",
            "${ALPACA_API_SECRET_KEY}",
        )
        .with("8400587790", "${TELEGRAM_CHAT_ID}")
        .with("marcoippel", "${GITHUB_REPO_OWNER}")
        .with("datproto-backup-n8n", "${GITHUB_REPO_NAME}")
}
