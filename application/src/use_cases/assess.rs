//! Assess use case
//!
//! Rebuilds the audit report of a subject from persisted records. Read-only:
//! two calls without writes in between return identical reports.

use crate::ports::repository::{DecisionRepository, RepositoryError};
use boomerang_domain::{AgentRegistry, AuditReport};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct AssessUseCase {
    registry: Arc<AgentRegistry>,
    repository: Arc<dyn DecisionRepository>,
}

impl AssessUseCase {
    pub fn new(registry: Arc<AgentRegistry>, repository: Arc<dyn DecisionRepository>) -> Self {
        Self {
            registry,
            repository,
        }
    }

    pub async fn execute(&self, subject_id: Uuid) -> Result<AuditReport, RepositoryError> {
        let latest = self.repository.latest_sessions_per_agent(subject_id).await?;
        let challenges = self.repository.challenges_ordered(subject_id).await?;
        debug!(
            "Assessing subject {}: {} sessions, {} challenges",
            subject_id,
            latest.len(),
            challenges.len()
        );

        let specialists: Vec<&str> = self
            .registry
            .specialists()
            .map(|a| a.name.as_str())
            .collect();
        Ok(AuditReport::build(&specialists, &latest, &challenges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::MemoryRepository;
    use boomerang_domain::{
        CallKind, Challenge, ChallengeRecord, Resolution, SessionRecord, Severity, Verdict,
        VerdictRecord,
    };
    use chrono::Utc;
    use serde_json::json;

    fn session(subject: Uuid, agent: &str, kind: CallKind, content: &str) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            subject_id: subject,
            agent: agent.to_string(),
            kind,
            model: "test-model".to_string(),
            prompt_version: "v1".to_string(),
            input_tokens: 10,
            output_tokens: 10,
            cost_cents: 0.0,
            request_payload: json!({}),
            response_payload: json!({ "content": content }),
            duration_ms: 5,
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (Uuid, AssessUseCase) {
        let subject = Uuid::new_v4();
        let repo = Arc::new(MemoryRepository::new());

        repo.insert_session(session(subject, "lyra", CallKind::Specialist, "Goals\n- Cut churn by ten percent"))
            .await
            .unwrap();
        repo.insert_session(session(subject, "dex", CallKind::Specialist, "Requirements look fine"))
            .await
            .unwrap();
        repo.insert_session(session(subject, "rex", CallKind::Specialist, ""))
            .await
            .unwrap();
        // A rebuttal never displaces the opinion
        repo.insert_session(session(subject, "dex", CallKind::ChallengeResponse, "Defending"))
            .await
            .unwrap();

        let challenge = Challenge {
            challenge_text: "Where is the churn baseline?".to_string(),
            severity: Severity::High,
            targeted_agents: vec!["lyra".to_string()],
            evidence_needed: "Historical churn data".to_string(),
        };
        let reviewer_session = Uuid::new_v4();
        let id = repo
            .insert_challenge(ChallengeRecord::new(subject, reviewer_session, &challenge))
            .await
            .unwrap();
        repo.insert_verdict(
            id,
            VerdictRecord::new(
                Verdict {
                    resolution: Resolution::Resolved,
                    resolution_text: "Baseline supplied".to_string(),
                },
                Uuid::new_v4(),
            ),
        )
        .await
        .unwrap();

        let open = Challenge {
            challenge_text: "Who owns delivery?".to_string(),
            severity: Severity::Low,
            targeted_agents: vec!["nova".to_string()],
            evidence_needed: "A named owner".to_string(),
        };
        repo.insert_challenge(ChallengeRecord::new(subject, reviewer_session, &open))
            .await
            .unwrap();

        let use_case = AssessUseCase::new(Arc::new(AgentRegistry::standard()), repo);
        (subject, use_case)
    }

    #[tokio::test]
    async fn test_assess_builds_report() {
        let (subject, use_case) = seeded().await;
        let report = use_case.execute(subject).await.unwrap();

        assert_eq!(report.agents_completed, vec!["lyra", "dex"]);
        assert_eq!(report.agent_assessments["dex"].summary, "Requirements look fine");
        assert_eq!(
            report.agent_assessments["lyra"].key_findings,
            vec!["Cut churn by ten percent"]
        );

        assert_eq!(report.decision_audit.len(), 2);
        assert_eq!(report.decision_audit[0].resolution, Resolution::Resolved);
        assert_eq!(report.decision_audit[0].evidence, "Baseline supplied");
        assert_eq!(report.decision_audit[1].resolution, Resolution::ActionRequired);
        assert_eq!(report.decision_audit[1].evidence, "A named owner");
    }

    #[tokio::test]
    async fn test_assess_is_idempotent() {
        let (subject, use_case) = seeded().await;
        let first = use_case.execute(subject).await.unwrap();
        let second = use_case.execute(subject).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_assess_unknown_subject_is_empty() {
        let (_, use_case) = seeded().await;
        let report = use_case.execute(Uuid::new_v4()).await.unwrap();
        assert!(report.is_empty());
    }
}
