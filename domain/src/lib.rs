//! Domain layer for boomerang
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Boomerang
//!
//! A panel of specialist agents each answer the same prompt independently,
//! then a single reviewer agent runs a bounded debate over the collective
//! output:
//!
//! - **Challenge**: the reviewer raises zero or more critiques
//! - **Response**: each targeted specialist defends its analysis
//! - **Verdict**: the reviewer rules on every challenge
//!
//! ## Audit
//!
//! Persisted sessions and challenges are read back into per-agent
//! assessments and a decision trail.

pub mod agent;
pub mod audit;
pub mod context;
pub mod core;
pub mod debate;
pub mod orchestration;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use agent::{AgentIdentity, AgentKind, AgentRegistry};
pub use audit::{AgentAssessment, AuditReport, DecisionAuditEntry};
pub use context::{Dimension, ExecutionContext, ProcessPhase};
pub use core::error::DomainError;
pub use debate::{
    Challenge, Resolution, Severity, SpecialistOutput, Verdict, parse_challenges, parse_verdict,
    strip_code_fence,
};
pub use orchestration::{
    BoomerangEvent, BoomerangOutcome, ChatEvent, DebateOutcome, DebateRound, FailureClass,
    FatalKind, RunStatus,
};
pub use prompt::{AgentPromptTemplate, Intersection, PromptTemplate};
pub use session::{
    CallKind, ChallengeRecord, SessionRecord, StreamEvent, TokenRates, UsageRecord, VerdictRecord,
};
