use super::assessment::AgentAssessment;
use crate::debate::Resolution;
use crate::session::{ChallengeRecord, SessionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One challenge as it appears in the decision trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionAuditEntry {
    pub challenge: String,
    pub resolution: Resolution,
    pub evidence: String,
    pub agents: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl DecisionAuditEntry {
    /// Unresolved challenges read as `action_required`. Evidence prefers the
    /// verdict text over the evidence the reviewer asked for.
    pub fn from_record(record: &ChallengeRecord) -> Self {
        let (resolution, evidence, timestamp) = match &record.verdict {
            Some(verdict) => (
                verdict.resolution,
                if verdict.resolution_text.is_empty() {
                    record.evidence_needed.clone()
                } else {
                    verdict.resolution_text.clone()
                },
                verdict.resolved_at,
            ),
            None => (
                Resolution::ActionRequired,
                record.evidence_needed.clone(),
                record.created_at,
            ),
        };

        Self {
            challenge: record.challenge_text.clone(),
            resolution,
            evidence,
            agents: record.targeted_agents.clone(),
            timestamp,
        }
    }
}

/// Everything the audit of one subject produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub agent_assessments: BTreeMap<String, AgentAssessment>,
    pub decision_audit: Vec<DecisionAuditEntry>,
    /// Specialists with a non-empty opinion, in panel order
    pub agents_completed: Vec<String>,
}

impl AuditReport {
    /// Assemble a report.
    ///
    /// `specialists` fixes the order of `agents_completed`; `latest` holds at
    /// most one session per agent; `challenges` must already be in creation
    /// order.
    pub fn build(
        specialists: &[&str],
        latest: &[SessionRecord],
        challenges: &[ChallengeRecord],
    ) -> Self {
        let mut agent_assessments = BTreeMap::new();
        let mut agents_completed = Vec::new();

        for name in specialists {
            let Some(session) = latest.iter().find(|s| s.agent == *name) else {
                continue;
            };
            let content = session.content();
            if content.is_empty() {
                continue;
            }
            agents_completed.push(name.to_string());
            agent_assessments.insert(name.to_string(), AgentAssessment::from_output(content));
        }

        Self {
            agent_assessments,
            decision_audit: challenges.iter().map(DecisionAuditEntry::from_record).collect(),
            agents_completed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents_completed.is_empty() && self.decision_audit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{Challenge, Severity, Verdict};
    use crate::session::{CallKind, VerdictRecord};
    use serde_json::json;
    use uuid::Uuid;

    fn session(agent: &str, content: &str) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            subject_id: Uuid::nil(),
            agent: agent.to_string(),
            kind: CallKind::Specialist,
            model: "m".to_string(),
            prompt_version: "v1".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cost_cents: 0.0,
            request_payload: json!({}),
            response_payload: json!({ "content": content }),
            duration_ms: 0,
            created_at: Utc::now(),
        }
    }

    fn challenge(text: &str, evidence: &str) -> ChallengeRecord {
        ChallengeRecord::new(
            Uuid::nil(),
            Uuid::new_v4(),
            &Challenge {
                challenge_text: text.to_string(),
                severity: Severity::High,
                targeted_agents: vec!["dex".to_string()],
                evidence_needed: evidence.to_string(),
            },
        )
    }

    #[test]
    fn test_unresolved_entry_defaults() {
        let record = challenge("No baseline", "Need numbers");
        let entry = DecisionAuditEntry::from_record(&record);
        assert_eq!(entry.resolution, Resolution::ActionRequired);
        assert_eq!(entry.evidence, "Need numbers");
        assert_eq!(entry.timestamp, record.created_at);
        assert_eq!(entry.agents, vec!["dex"]);
    }

    #[test]
    fn test_resolved_entry_prefers_verdict() {
        let mut record = challenge("No baseline", "Need numbers");
        let verdict = VerdictRecord::new(
            Verdict {
                resolution: Resolution::Resolved,
                resolution_text: "Numbers supplied".to_string(),
            },
            Uuid::new_v4(),
        );
        let resolved_at = verdict.resolved_at;
        record.verdict = Some(verdict);

        let entry = DecisionAuditEntry::from_record(&record);
        assert_eq!(entry.resolution, Resolution::Resolved);
        assert_eq!(entry.evidence, "Numbers supplied");
        assert_eq!(entry.timestamp, resolved_at);
    }

    #[test]
    fn test_empty_verdict_text_falls_back_to_evidence() {
        let mut record = challenge("c", "Need numbers");
        record.verdict = Some(VerdictRecord::new(
            Verdict {
                resolution: Resolution::AcceptedRisk,
                resolution_text: String::new(),
            },
            Uuid::new_v4(),
        ));
        assert_eq!(DecisionAuditEntry::from_record(&record).evidence, "Need numbers");
    }

    #[test]
    fn test_build_skips_missing_and_empty_outputs() {
        let latest = vec![
            session("nova", "- Roll out in three phases please"),
            session("lyra", "Grow revenue"),
            session("mira", ""),
        ];
        let report = AuditReport::build(&["lyra", "mira", "dex", "nova"], &latest, &[]);
        assert_eq!(report.agents_completed, vec!["lyra", "nova"]);
        assert_eq!(report.agent_assessments.len(), 2);
        assert_eq!(report.agent_assessments["lyra"].summary, "Grow revenue");
        assert!(report.decision_audit.is_empty());
        assert!(!report.is_empty());
    }

    #[test]
    fn test_build_keeps_challenge_order() {
        let report = AuditReport::build(
            &[],
            &[],
            &[challenge("first", ""), challenge("second", "")],
        );
        let texts: Vec<_> = report.decision_audit.iter().map(|e| e.challenge.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
