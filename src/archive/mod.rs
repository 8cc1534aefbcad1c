//! Writing and inspecting the organized archive
//!
//! The organizer combines deduplication, categorization, redaction and naming
//! into `<output>/<category>/<name>.json` plus a companion `.md` file. The
//! health checker inspects an archive produced that way.

pub mod docs;
pub mod health;
pub mod organizer;

pub use docs::{NodeSummary, WorkflowSummary};
pub use health::{CheckResult, CheckStatus, HealthChecker, HealthReport};
pub use organizer::{OrganizeReport, OrganizedWorkflow, Organizer, SkippedFile};
