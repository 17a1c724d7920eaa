//! Debate use case
//!
//! Drives the reviewer's bounded debate over a set of specialist outputs:
//!
//! 1. **Challenge**: one reviewer call raises zero or more challenges, all
//!    parsed and persisted up front.
//! 2. **Response**: per challenge, in order, each targeted specialist answers.
//! 3. **Verdict**: the reviewer rules on the challenge.
//!
//! Provider errors propagate to the caller; malformed reviewer output never
//! does (see [`boomerang_domain::debate::parsing`]).

use crate::ports::event_sink::BoomerangEventSink;
use crate::ports::repository::RepositoryError;
use crate::use_cases::agent::{AgentError, AgentPool};
use boomerang_domain::debate::{
    fallback_challenge, fallback_verdict, try_parse_challenges, try_parse_verdict,
};
use boomerang_domain::{
    BoomerangEvent, CallKind, Challenge, ChallengeRecord, DebateOutcome, DebateRound,
    ExecutionContext, FailureClass, PromptTemplate, SpecialistOutput, VerdictRecord,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors of a re-challenge from persisted history
#[derive(Error, Debug, Clone)]
pub enum DebateError {
    #[error("No specialist outputs found for this subject. Run the agents first.")]
    NoSpecialistOutputs,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl DebateError {
    pub fn classify(&self) -> FailureClass {
        match self {
            DebateError::Agent(e) => e.classify(),
            DebateError::NoSpecialistOutputs => FailureClass::Recoverable,
        }
    }
}

impl From<RepositoryError> for DebateError {
    fn from(e: RepositoryError) -> Self {
        DebateError::Agent(e.into())
    }
}

/// Runs the challenge → response → verdict flow
pub struct DebateController {
    pool: Arc<AgentPool>,
}

impl DebateController {
    pub fn new(pool: Arc<AgentPool>) -> Self {
        Self { pool }
    }

    /// Run the debate over `outputs`, emitting `axiom_challenge`,
    /// `challenge_response` and `axiom_verdict` events as it goes.
    pub async fn run(
        &self,
        outputs: &[SpecialistOutput],
        context: &ExecutionContext,
        events: &dyn BoomerangEventSink,
    ) -> Result<DebateOutcome, AgentError> {
        let reviewer = self.pool.reviewer();
        let reviewer_system = reviewer.system_prompt(context);
        let repository = self.pool.repository();

        info!(
            "Debate: reviewer {} challenging {} specialist outputs",
            reviewer.name(),
            outputs.len()
        );

        // Phase 1: Challenge
        let prompt = PromptTemplate::challenge_prompt(outputs);
        let raised = reviewer
            .raw_chat(CallKind::Challenge, &prompt, &reviewer_system, None, context)
            .await?;
        let challenges = parse_challenges_logged(&raised.text);
        info!("Debate: {} challenges raised", challenges.len());

        let mut persisted = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            let record = ChallengeRecord::new(context.subject_id, raised.session_id, &challenge);
            let id = repository.insert_challenge(record).await?;
            persisted.push((id, challenge));
        }

        let mut rounds = Vec::with_capacity(persisted.len());
        for (challenge_id, challenge) in persisted {
            events.emit(&BoomerangEvent::AxiomChallenge {
                challenge_text: challenge.challenge_text.clone(),
                severity: challenge.severity,
                targeted_agents: challenge.targeted_agents.clone(),
                evidence_needed: challenge.evidence_needed.clone(),
            });

            // Phase 2: Responses
            let responses = self.collect_responses(&challenge, context, events).await?;

            // Phase 3: Verdict
            let prompt = PromptTemplate::verdict_prompt(&challenge.challenge_text, &responses);
            let ruled = reviewer
                .raw_chat(CallKind::Verdict, &prompt, &reviewer_system, None, context)
                .await?;
            let verdict = parse_verdict_logged(&ruled.text);
            repository
                .insert_verdict(
                    challenge_id,
                    VerdictRecord::new(verdict.clone(), ruled.session_id),
                )
                .await?;

            events.emit(&BoomerangEvent::AxiomVerdict {
                challenge_text: challenge.challenge_text.clone(),
                resolution: verdict.resolution,
                resolution_text: verdict.resolution_text.clone(),
            });

            rounds.push(DebateRound {
                challenge_id,
                challenge,
                responses,
                verdict,
            });
        }

        Ok(DebateOutcome {
            challenge_session_id: raised.session_id,
            rounds,
        })
    }

    /// Re-run the debate against the latest persisted opinion of every
    /// specialist, then emit `challenge_complete`.
    pub async fn challenge_from_history(
        &self,
        context: &ExecutionContext,
        events: &dyn BoomerangEventSink,
    ) -> Result<DebateOutcome, DebateError> {
        let outputs = latest_specialist_outputs(&self.pool, context.subject_id).await?;
        if outputs.is_empty() {
            return Err(DebateError::NoSpecialistOutputs);
        }

        let outcome = self.run(&outputs, context, events).await?;
        events.emit(&BoomerangEvent::ChallengeComplete {
            subject_id: context.subject_id,
        });
        Ok(outcome)
    }

    async fn collect_responses(
        &self,
        challenge: &Challenge,
        context: &ExecutionContext,
        events: &dyn BoomerangEventSink,
    ) -> Result<Vec<(String, String)>, AgentError> {
        let reviewer = self.pool.reviewer();
        let prompt =
            PromptTemplate::challenge_response_prompt(reviewer.name(), &challenge.challenge_text);
        let mut responses = Vec::new();

        for name in challenge.unique_targets() {
            if name == reviewer.name() {
                warn!("Challenge targets the reviewer itself; skipping");
                continue;
            }
            let Ok(agent) = self.pool.get(name) else {
                warn!("Challenge targets unknown agent '{}'; skipping", name);
                continue;
            };

            let system = agent.system_prompt(context);
            let answered = agent
                .raw_chat(CallKind::ChallengeResponse, &prompt, &system, None, context)
                .await?;

            events.emit(&BoomerangEvent::ChallengeResponse {
                agent: name.to_string(),
                challenge_text: challenge.challenge_text.clone(),
                response: answered.text.clone(),
            });
            responses.push((name.to_string(), answered.text));
        }

        Ok(responses)
    }
}

/// Latest non-empty opinion of each specialist, in registry order
pub(crate) async fn latest_specialist_outputs(
    pool: &AgentPool,
    subject_id: Uuid,
) -> Result<Vec<SpecialistOutput>, RepositoryError> {
    let latest = pool.repository().latest_sessions_per_agent(subject_id).await?;

    Ok(pool
        .specialists()
        .filter_map(|agent| {
            let session = latest.iter().find(|s| s.agent == agent.name())?;
            let content = session.content();
            (!content.is_empty()).then(|| SpecialistOutput {
                agent: agent.name().to_string(),
                role: agent.identity().role.clone(),
                content: content.to_string(),
            })
        })
        .collect())
}

fn parse_challenges_logged(content: &str) -> Vec<Challenge> {
    try_parse_challenges(content).unwrap_or_else(|e| {
        warn!("Failed to parse reviewer challenges: {}", e);
        vec![fallback_challenge(content)]
    })
}

fn parse_verdict_logged(content: &str) -> boomerang_domain::Verdict {
    try_parse_verdict(content).unwrap_or_else(|e| {
        warn!("Failed to parse reviewer verdict: {}", e);
        fallback_verdict(content)
    })
}
