//! Audit domain
//!
//! Read models rebuilt from persisted history: a heuristic assessment per
//! specialist and a decision trail per challenge.

mod assessment;
mod report;

pub use assessment::AgentAssessment;
pub use report::{AuditReport, DecisionAuditEntry};
