//! Persisted records of model calls and debate outcomes.
//!
//! These are append-only: a verdict is the only thing ever attached to an
//! existing record, and it lands on its challenge exactly once.

use crate::debate::{Challenge, Resolution, Severity, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// What a model call was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Streaming chat with one agent
    Chat,
    /// A specialist's opinion during a Boomerang run
    Specialist,
    /// The reviewer raising challenges
    Challenge,
    /// A specialist answering a challenge
    ChallengeResponse,
    /// The reviewer ruling on a challenge
    Verdict,
    /// Synopsis of a finished analysis
    Synopsis,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Chat => "chat",
            CallKind::Specialist => "specialist",
            CallKind::Challenge => "challenge",
            CallKind::ChallengeResponse => "challenge_response",
            CallKind::Verdict => "verdict",
            CallKind::Synopsis => "synopsis",
        }
    }

    /// Whether the call carries the agent's own opinion on the subject.
    ///
    /// Only these count as an agent's "latest output" when audit and
    /// re-challenge read history back.
    pub fn is_opinion(&self) -> bool {
        matches!(self, CallKind::Chat | CallKind::Specialist)
    }

    /// Usage endpoint tag for a call made by `agent`
    pub fn endpoint(&self, agent: &str) -> String {
        match self {
            CallKind::Chat => format!("chat/{agent}"),
            CallKind::Specialist => format!("boomerang/specialist/{agent}"),
            CallKind::Challenge => format!("boomerang/{agent}/challenge"),
            CallKind::ChallengeResponse => format!("boomerang/challenge_response/{agent}"),
            CallKind::Verdict => format!("boomerang/{agent}/verdict"),
            CallKind::Synopsis => "synopsis".to_string(),
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub agent: String,
    pub kind: CallKind,
    pub model: String,
    pub prompt_version: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_cents: f64,
    pub request_payload: Value,
    pub response_payload: Value,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// The response text stored under `response_payload.content`
    pub fn content(&self) -> &str {
        self.response_payload
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// The reviewer's ruling, attached to its challenge once issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub resolution: Resolution,
    pub resolution_text: String,
    /// Session of the reviewer call that produced the verdict
    pub session_id: Uuid,
    pub resolved_at: DateTime<Utc>,
}

impl VerdictRecord {
    pub fn new(verdict: Verdict, session_id: Uuid) -> Self {
        Self {
            resolution: verdict.resolution,
            resolution_text: verdict.resolution_text,
            session_id,
            resolved_at: Utc::now(),
        }
    }
}

/// A persisted challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: Uuid,
    pub subject_id: Uuid,
    /// Session of the reviewer call that raised the challenge
    pub session_id: Uuid,
    pub challenge_text: String,
    pub severity: Severity,
    pub targeted_agents: Vec<String>,
    pub evidence_needed: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub verdict: Option<VerdictRecord>,
}

impl ChallengeRecord {
    pub fn new(subject_id: Uuid, session_id: Uuid, challenge: &Challenge) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            session_id,
            challenge_text: challenge.challenge_text.clone(),
            severity: challenge.severity,
            targeted_agents: challenge.targeted_agents.clone(),
            evidence_needed: challenge.evidence_needed.clone(),
            created_at: Utc::now(),
            verdict: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.verdict.is_some()
    }
}

/// Billing line for one model call, kept only for attributed contexts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub service: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_cents: f64,
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
}
