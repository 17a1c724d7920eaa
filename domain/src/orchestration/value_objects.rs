//! Orchestration value objects - result types of a run and its debate.

use crate::debate::{Challenge, SpecialistOutput, Verdict};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One challenge carried through response and verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    pub challenge_id: Uuid,
    pub challenge: Challenge,
    /// `(agent, response)` in the order the specialists answered
    pub responses: Vec<(String, String)>,
    pub verdict: Verdict,
}

/// Everything the bounded debate produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Session of the reviewer call that raised the challenges
    pub challenge_session_id: Uuid,
    pub rounds: Vec<DebateRound>,
}

impl DebateOutcome {
    pub fn challenge_count(&self) -> usize {
        self.rounds.len()
    }
}

/// How a Boomerang run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Specialists answered and the debate ran to completion
    Completed,
    /// Specialists answered but the debate raised a recoverable error
    DebateFailed,
    /// A fatal error or cancellation stopped the run
    Aborted,
    /// Every specialist failed
    NoOutputs,
}

/// Complete result of a Boomerang run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoomerangOutcome {
    pub subject_id: Uuid,
    pub status: RunStatus,
    /// Successful specialist opinions in completion order
    pub specialist_outputs: Vec<SpecialistOutput>,
    /// Specialists whose call failed or was cancelled
    pub failed_agents: Vec<String>,
    pub debate: Option<DebateOutcome>,
}

impl BoomerangOutcome {
    pub fn agents_completed(&self) -> Vec<String> {
        self.specialist_outputs
            .iter()
            .map(|output| output.agent.clone())
            .collect()
    }

    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }
}
