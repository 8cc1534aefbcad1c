//! # Flowkeeper
//!
//! Keeps a directory of exported n8n workflow JSON files tidy: collapses
//! duplicate exports, scrubs credentials, names and categorizes workflows,
//! validates them against a JSON Schema and checks the resulting archive.
//!
//! ## Usage
//!
//! ```bash
//! flowkeeper dedupe exports/ [--dry-run]
//! flowkeeper organize exports/ --output workflows/
//! flowkeeper validate workflows/ [--schema schema.json]
//! flowkeeper health workflows/
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup, verbosity and fatal error reporting for the binary
//! - `archive` - Organizer writing `<category>/<name>.{json,md}` and the archive health check
//! - `categorize` - Keyword scoring of workflows into categories
//! - `config` - Category rules, credential mappings and TOML loading
//! - `dedupe` - Identity grouping and removal of older duplicate files
//! - `error` - Library error type
//! - `naming` - Filesystem-safe workflow names
//! - `redact` - Credential scrubbing with `${NAME}` placeholders
//! - `validate` - Schema validation and quality warnings
//! - `workflow` - Workflow document model and JSON I/O
pub mod app;
pub mod archive;
pub mod categorize;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod naming;
pub mod redact;
pub mod validate;
pub mod workflow;

pub use error::{Error, Result};
