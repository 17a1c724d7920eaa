//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Duplicate agent in registry: {0}")]
    DuplicateAgent(String),

    #[error("Registry must contain exactly one reviewer, found {0}")]
    ReviewerCount(usize),

    #[error("Registry must contain at least one specialist")]
    NoSpecialists,

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Invalid phase: {0}")]
    InvalidPhase(String),
}

impl DomainError {
    /// Check if this error is a lookup of an agent name outside the registry
    pub fn is_unknown_agent(&self) -> bool {
        matches!(self, DomainError::UnknownAgent(_))
    }
}
