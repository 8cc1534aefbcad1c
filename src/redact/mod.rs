//! Credential scrubbing for workflow documents
//!
//! Two kinds of string leaves are rewritten:
//!
//! 1. Any string containing a configured secret literal has every occurrence of
//!    that literal replaced by its `${NAME}` placeholder.
//! 2. A string stored under a key whose name contains `key` or `token` (ignoring
//!    case) that looks like an API key (32 or more ASCII alphanumerics) is replaced
//!    wholesale by `${KEY_NAME}`, the key name uppercased.
//!
//! Numbers, booleans and null are never touched. Redaction is idempotent.

use crate::config::{ConfigValidator, CredentialMapping};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

static API_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{32,}$").expect("valid api key regex"));

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("valid placeholder regex"));

#[derive(Debug, Clone)]
pub struct Redactor {
    credentials: CredentialMapping,
}

impl Redactor {
    /// Build a redactor, rejecting mappings that could not be applied idempotently
    pub fn new(credentials: CredentialMapping) -> Result<Self> {
        ConfigValidator::validate_credentials(&credentials)?;
        Ok(Self { credentials })
    }

    /// Return a scrubbed copy of `value`
    pub fn redact(&self, value: &Value) -> Value {
        self.redact_value(value, None)
    }

    pub fn redact_in_place(&self, value: &mut Value) {
        *value = self.redact(value);
    }

    fn redact_value(&self, value: &Value, key: Option<&str>) -> Value {
        match value {
            Value::String(text) => Value::String(self.redact_string(text, key)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.redact_value(item, None))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.redact_value(v, Some(k))))
                    .collect::<Map<String, Value>>(),
            ),
            other => other.clone(),
        }
    }

    fn redact_string(&self, text: &str, key: Option<&str>) -> String {
        let mut scrubbed = text.to_string();
        for rule in self.credentials.iter() {
            if scrubbed.contains(&rule.value) {
                scrubbed = scrubbed.replace(&rule.value, &rule.placeholder);
            }
        }

        match key {
            Some(key) if is_secret_key(key) && API_KEY_REGEX.is_match(&scrubbed) => {
                format!("${{{}}}", key.to_uppercase())
            }
            _ => scrubbed,
        }
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("key") || key.contains("token")
}

/// Names of every `${NAME}` placeholder found in the string leaves of `value`
pub fn placeholder_names(value: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut stack = vec![value];

    while let Some(current) = stack.pop() {
        match current {
            Value::String(text) => {
                names.extend(
                    PLACEHOLDER_REGEX
                        .captures_iter(text)
                        .map(|caps| caps[1].to_string()),
                );
            }
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.values()),
            _ => {}
        }
    }

    names
}
