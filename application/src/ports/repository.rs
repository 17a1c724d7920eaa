//! Decision repository port
//!
//! Append-only persistence of model calls and debate outcomes, plus the two
//! read-backs that audit and re-challenge depend on.

use async_trait::async_trait;
use boomerang_domain::{ChallengeRecord, SessionRecord, UsageRecord, VerdictRecord};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Challenge not found: {0}")]
    ChallengeNotFound(Uuid),

    #[error("Challenge {0} already has a verdict")]
    VerdictExists(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence of sessions, challenges, verdicts and usage.
///
/// Implementations must tolerate concurrent callers: specialist tasks write
/// in parallel during a run.
#[async_trait]
pub trait DecisionRepository: Send + Sync {
    /// Store a model call and return its id
    async fn insert_session(&self, record: SessionRecord) -> Result<Uuid, RepositoryError>;

    /// Store a challenge and return its id
    async fn insert_challenge(&self, record: ChallengeRecord) -> Result<Uuid, RepositoryError>;

    /// Attach the verdict to an existing challenge. A challenge takes exactly
    /// one verdict.
    async fn insert_verdict(
        &self,
        challenge_id: Uuid,
        verdict: VerdictRecord,
    ) -> Result<(), RepositoryError>;

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), RepositoryError>;

    /// Most recent opinion-bearing session (`chat` or `specialist`) of each
    /// agent for the subject
    async fn latest_sessions_per_agent(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<SessionRecord>, RepositoryError>;

    /// Every challenge of the subject, oldest first, verdicts attached
    async fn challenges_ordered(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<ChallengeRecord>, RepositoryError>;
}
