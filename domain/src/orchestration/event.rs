//! Events emitted while a Boomerang run or a chat is in progress.
//!
//! Each event is a name plus a JSON payload. Serialized form:
//! `{"event": "<name>", "data": {...}}`.

use crate::debate::{Resolution, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Progress and result events of a Boomerang run or a standalone challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BoomerangEvent {
    BoomerangStart {
        subject_id: Uuid,
    },
    Phase {
        phase: String,
        completed: usize,
        total: usize,
    },
    AgentStart {
        agent: String,
    },
    AgentComplete {
        agent: String,
        content: String,
        session_id: Uuid,
        input_tokens: u32,
        output_tokens: u32,
        cost_cents: f64,
    },
    AgentError {
        agent: String,
        error: String,
        classification: String,
    },
    AxiomStart {
        agent: String,
    },
    AxiomChallenge {
        challenge_text: String,
        severity: Severity,
        targeted_agents: Vec<String>,
        evidence_needed: String,
    },
    ChallengeResponse {
        agent: String,
        challenge_text: String,
        response: String,
    },
    AxiomVerdict {
        challenge_text: String,
        resolution: Resolution,
        resolution_text: String,
    },
    BoomerangError {
        error: String,
        message: String,
    },
    BoomerangComplete {
        subject_id: Uuid,
        agents_completed: Vec<String>,
        aborted: bool,
    },
    Error {
        error: String,
    },
    ChallengeComplete {
        subject_id: Uuid,
    },
}

impl BoomerangEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            BoomerangEvent::BoomerangStart { .. } => "boomerang_start",
            BoomerangEvent::Phase { .. } => "phase",
            BoomerangEvent::AgentStart { .. } => "agent_start",
            BoomerangEvent::AgentComplete { .. } => "agent_complete",
            BoomerangEvent::AgentError { .. } => "agent_error",
            BoomerangEvent::AxiomStart { .. } => "axiom_start",
            BoomerangEvent::AxiomChallenge { .. } => "axiom_challenge",
            BoomerangEvent::ChallengeResponse { .. } => "challenge_response",
            BoomerangEvent::AxiomVerdict { .. } => "axiom_verdict",
            BoomerangEvent::BoomerangError { .. } => "boomerang_error",
            BoomerangEvent::BoomerangComplete { .. } => "boomerang_complete",
            BoomerangEvent::Error { .. } => "error",
            BoomerangEvent::ChallengeComplete { .. } => "challenge_complete",
        }
    }

    /// The event's payload as a JSON object
    pub fn payload(&self) -> Value {
        data_of(serde_json::to_value(self))
    }

    /// Whether nothing else follows this event in its stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BoomerangEvent::BoomerangComplete { .. }
                | BoomerangEvent::Error { .. }
                | BoomerangEvent::ChallengeComplete { .. }
        )
    }
}

/// Events of a single-agent streaming chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    Token {
        agent: String,
        content: String,
    },
    Done {
        agent: String,
        session_id: Uuid,
        input_tokens: u32,
        output_tokens: u32,
        cost_cents: f64,
        duration_ms: u64,
    },
    Error {
        agent: String,
        error: String,
        /// `recoverable`, `credit_balance` or `authentication`
        classification: String,
    },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Token { .. } => "token",
            ChatEvent::Done { .. } => "done",
            ChatEvent::Error { .. } => "error",
        }
    }

    pub fn payload(&self) -> Value {
        data_of(serde_json::to_value(self))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatEvent::Token { .. })
    }
}

fn data_of(value: serde_json::Result<Value>) -> Value {
    match value {
        Ok(Value::Object(mut map)) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let event = BoomerangEvent::AgentStart {
            agent: "lyra".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "agent_start", "data": {"agent": "lyra"}})
        );
        assert_eq!(event.name(), "agent_start");
        assert_eq!(event.payload(), json!({"agent": "lyra"}));
    }

    #[test]
    fn test_name_matches_serde_tag() {
        let id = Uuid::new_v4();
        let events = vec![
            BoomerangEvent::BoomerangStart { subject_id: id },
            BoomerangEvent::Phase {
                phase: "specialists".to_string(),
                completed: 1,
                total: 8,
            },
            BoomerangEvent::AxiomChallenge {
                challenge_text: "c".to_string(),
                severity: Severity::Low,
                targeted_agents: vec![],
                evidence_needed: String::new(),
            },
            BoomerangEvent::AxiomVerdict {
                challenge_text: "c".to_string(),
                resolution: Resolution::AcceptedRisk,
                resolution_text: String::new(),
            },
            BoomerangEvent::BoomerangComplete {
                subject_id: id,
                agents_completed: vec!["dex".to_string()],
                aborted: true,
            },
            BoomerangEvent::ChallengeComplete { subject_id: id },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn test_verdict_payload_uses_snake_case_resolution() {
        let event = BoomerangEvent::AxiomVerdict {
            challenge_text: "c".to_string(),
            resolution: Resolution::ActionRequired,
            resolution_text: "fix it".to_string(),
        };
        assert_eq!(event.payload()["resolution"], "action_required");
    }

    #[test]
    fn test_terminal_events() {
        assert!(BoomerangEvent::Error { error: "x".to_string() }.is_terminal());
        assert!(
            !BoomerangEvent::AxiomStart {
                agent: "axiom".to_string()
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_chat_event_round_trip() {
        let event = ChatEvent::Token {
            agent: "mira".to_string(),
            content: "Hel".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: ChatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(event.name(), "token");
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_chat_error_payload_carries_classification() {
        let event = ChatEvent::Error {
            agent: "vela".to_string(),
            error: "Credit balance exhausted".to_string(),
            classification: "credit_balance".to_string(),
        };
        assert!(event.is_terminal());
        assert_eq!(
            event.payload(),
            json!({
                "agent": "vela",
                "error": "Credit balance exhausted",
                "classification": "credit_balance"
            })
        );
    }
}
