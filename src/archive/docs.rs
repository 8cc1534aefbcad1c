//! Companion documentation for archived workflows

use crate::redact::placeholder_names;
use crate::workflow::{NodeView, WorkflowDocument};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub node_type: String,
}

/// Everything the `.md` file next to an archived workflow is rendered from
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub category: String,
    pub description: String,
    pub nodes: Vec<NodeSummary>,
    pub triggers: Vec<NodeSummary>,
    /// `${NAME}` placeholders the workflow expects, without the `${}`
    pub placeholders: Vec<String>,
    pub identity: String,
}

impl WorkflowSummary {
    /// Summarize an already redacted document
    pub fn from_document(
        document: &WorkflowDocument,
        name: &str,
        category: &str,
        description: &str,
        identity: &str,
    ) -> Self {
        let summarize = |node: NodeView<'_>| NodeSummary {
            name: node.name().unwrap_or_default().to_string(),
            node_type: node.node_type().unwrap_or_default().to_string(),
        };

        Self {
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            nodes: document.nodes().map(summarize).collect(),
            triggers: document
                .nodes()
                .filter(|node| node.type_is_trigger())
                .map(summarize)
                .collect(),
            placeholders: placeholder_names(document.as_value()).into_iter().collect(),
            identity: identity.to_string(),
        }
    }

    /// "daily-price-check" -> "Daily Price Check"
    pub fn title(&self) -> String {
        self.name
            .split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn to_markdown(&self) -> String {
        let mut markdown = String::new();

        markdown.push_str(&format!("# {}\n\n", self.title()));

        markdown.push_str("## Overview\n");
        markdown.push_str(&format!("Category: **{}**  \n", self.category));
        markdown.push_str(&format!("Nodes: **{}**  \n", self.nodes.len()));
        markdown.push_str(&format!("Triggers: **{}**\n\n", self.triggers.len()));

        markdown.push_str("## Description\n");
        markdown.push_str(&format!("{}\n\n", self.description));

        markdown.push_str("## Nodes\n");
        push_node_list(&mut markdown, &self.nodes, "No nodes found");

        markdown.push_str("## Triggers\n");
        push_node_list(&mut markdown, &self.triggers, "No triggers found");

        markdown.push_str("## Configuration\n");
        if self.placeholders.is_empty() {
            markdown.push_str("This workflow does not require any environment variables.\n\n");
        } else {
            markdown.push_str("This workflow requires the following environment variables:\n");
            for placeholder in &self.placeholders {
                markdown.push_str(&format!("- `{placeholder}`\n"));
            }
            markdown.push('\n');
        }

        markdown.push_str("## Usage\n");
        markdown.push_str("1. Import this workflow into your n8n instance\n");
        markdown.push_str("2. Configure the required credentials and environment variables\n");
        markdown.push_str("3. Activate the workflow\n\n");

        markdown.push_str("## Notes\n");
        markdown.push_str(&format!("- Original workflow ID: `{}`\n", self.identity));
        markdown.push_str("- Sensitive values have been replaced with `${VARIABLE}` placeholders\n");

        markdown
    }
}

fn push_node_list(markdown: &mut String, nodes: &[NodeSummary], empty: &str) {
    if nodes.is_empty() {
        markdown.push_str(&format!("{empty}\n\n"));
        return;
    }

    for node in nodes {
        markdown.push_str(&format!("- **{}** ({})\n", node.name, node.node_type));
    }
    markdown.push('\n');
}
