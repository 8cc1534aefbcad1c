//! Keyword-frequency categorization
//!
//! Each category scores the number of times its keywords occur in the compact
//! JSON text of a workflow. The highest score wins; on a tie the category listed
//! first keeps the win, and a workflow that matches nothing lands in the default
//! category. Keywords are plain substrings, so "ai" also counts inside "email".

use crate::config::{ArchiveConfig, CategoryRule};
use crate::workflow::WorkflowDocument;
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use tracing::trace;

#[derive(Debug)]
struct CompiledCategory {
    name: String,
    keywords: Vec<Regex>,
}

/// Scores workflows against a fixed, ordered set of categories
#[derive(Debug)]
pub struct Categorizer {
    categories: Vec<CompiledCategory>,
    default_category: String,
}

/// Score of a single category for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryScore {
    pub category: String,
    pub score: usize,
}

impl Categorizer {
    pub fn new(rules: &[CategoryRule], default_category: impl Into<String>) -> Result<Self> {
        let categories = rules
            .iter()
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .iter()
                    .map(|keyword| {
                        RegexBuilder::new(&regex::escape(keyword))
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| {
                                Error::Config(format!("Invalid keyword '{keyword}': {e}"))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(CompiledCategory {
                    name: rule.name.clone(),
                    keywords,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            categories,
            default_category: default_category.into(),
        })
    }

    pub fn from_config(config: &ArchiveConfig) -> Result<Self> {
        Self::new(&config.categories, config.default_category.clone())
    }

    /// Scores for every category, in configuration order
    pub fn score_all(&self, document: &WorkflowDocument) -> Vec<CategoryScore> {
        let text = document.to_compact_string().to_lowercase();

        self.categories
            .iter()
            .map(|category| CategoryScore {
                category: category.name.clone(),
                score: category
                    .keywords
                    .iter()
                    .map(|keyword| keyword.find_iter(&text).count())
                    .sum(),
            })
            .collect()
    }

    /// Pick the best matching category name
    pub fn categorize(&self, document: &WorkflowDocument) -> String {
        let mut best = self.default_category.as_str();
        let mut max_score = 0;

        let scores = self.score_all(document);
        for score in &scores {
            if score.score > max_score {
                max_score = score.score;
                best = &score.category;
            }
        }

        trace!("Category scores: {:?} -> {}", scores, best);
        best.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_categories;
    use serde_json::json;

    fn categorizer() -> Categorizer {
        Categorizer::new(&default_categories(), "automation").unwrap()
    }

    #[test]
    fn test_alert_workflow() {
        let doc = WorkflowDocument::new(json!({
            "nodes": [
                { "name": "Telegram Alert", "type": "n8n-nodes-base.telegram" },
                { "name": "Monitor Price", "type": "n8n-nodes-base.cron" }
            ]
        }));
        assert_eq!(categorizer().categorize(&doc), "alerts");
    }

    #[test]
    fn test_single_category_keywords_score_zero_elsewhere() {
        let doc = WorkflowDocument::new(json!({ "x": "backup github export" }));
        let scores = categorizer().score_all(&doc);

        assert_eq!(
            scores,
            vec![
                CategoryScore { category: "alerts".into(), score: 0 },
                CategoryScore { category: "analytics".into(), score: 0 },
                CategoryScore { category: "automation".into(), score: 0 },
                CategoryScore { category: "backup".into(), score: 3 },
            ]
        );
        assert_eq!(categorizer().categorize(&doc), "backup");
    }

    #[test]
    fn test_no_match_returns_default() {
        let doc = WorkflowDocument::new(json!({ "x": "zzz" }));
        assert_eq!(categorizer().categorize(&doc), "automation");
    }

    #[test]
    fn test_tie_keeps_first_category() {
        let rules = vec![
            CategoryRule::new("first", &["alpha"], ""),
            CategoryRule::new("second", &["beta"], ""),
        ];
        let categorizer = Categorizer::new(&rules, "second").unwrap();
        let doc = WorkflowDocument::new(json!({ "x": "beta alpha" }));
        assert_eq!(categorizer.categorize(&doc), "first");
    }

    #[test]
    fn test_counts_are_case_insensitive_and_non_overlapping() {
        let rules = vec![CategoryRule::new("only", &["AA"], "")];
        let categorizer = Categorizer::new(&rules, "only").unwrap();
        let doc = WorkflowDocument::new(json!({ "x": "aaaaa" }));
        assert_eq!(categorizer.score_all(&doc)[0].score, 2);
    }

    #[test]
    fn test_keywords_are_literal() {
        let rules = vec![
            CategoryRule::new("dots", &["a.b"], ""),
            CategoryRule::new("other", &["zzz"], ""),
        ];
        let categorizer = Categorizer::new(&rules, "other").unwrap();
        let doc = WorkflowDocument::new(json!({ "x": "axb" }));
        assert_eq!(categorizer.categorize(&doc), "other");
    }

    #[test]
    fn test_keys_count_too() {
        // Keys are part of the serialized text, so "data" in a key scores
        let doc = WorkflowDocument::new(json!({ "data": 1 }));
        assert_eq!(categorizer().categorize(&doc), "analytics");
    }
}
