use super::{ArchiveConfig, CredentialMapping};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{[A-Za-z0-9_]+\}$").expect("valid placeholder regex"));

static CATEGORY_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid category name regex"));

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &ArchiveConfig) -> Result<()> {
        Self::validate_categories(config)?;
        Self::validate_credentials(&config.credentials)?;

        if config.sticky_note_type.is_empty() {
            return Err(Error::Config(
                "sticky_note_type cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_categories(config: &ArchiveConfig) -> Result<()> {
        if config.categories.is_empty() {
            return Err(Error::Config(
                "At least one category must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &config.categories {
            // Category names become directory names
            if !CATEGORY_NAME_REGEX.is_match(&category.name) {
                return Err(Error::Config(format!(
                    "Invalid category name '{}'. Use lowercase letters, digits, '-' or '_'",
                    category.name
                )));
            }

            if !seen.insert(category.name.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate category name '{}'",
                    category.name
                )));
            }

            if category.keywords.is_empty() || category.keywords.iter().any(|k| k.is_empty()) {
                return Err(Error::Config(format!(
                    "Category '{}' needs at least one non-empty keyword",
                    category.name
                )));
            }
        }

        if config.category(&config.default_category).is_none() {
            return Err(Error::Config(format!(
                "Default category '{}' is not one of the configured categories",
                config.default_category
            )));
        }

        Ok(())
    }

    pub fn validate_credentials(credentials: &CredentialMapping) -> Result<()> {
        for rule in credentials.iter() {
            if rule.value.is_empty() {
                return Err(Error::Config(
                    "Credential values cannot be empty".to_string(),
                ));
            }

            if !PLACEHOLDER_REGEX.is_match(&rule.placeholder) {
                return Err(Error::Config(format!(
                    "Invalid placeholder '{}'. Expected the form ${{NAME}}",
                    rule.placeholder
                )));
            }
        }

        // A placeholder that embeds a secret would be rewritten on every pass
        for rule in credentials.iter() {
            if let Some(other) = credentials
                .iter()
                .find(|other| rule.placeholder.contains(&other.value))
            {
                return Err(Error::Config(format!(
                    "Placeholder '{}' contains the credential value '{}'",
                    rule.placeholder, other.value
                )));
            }
        }

        Ok(())
    }
}
