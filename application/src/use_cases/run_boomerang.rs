//! Run Boomerang use case
//!
//! Orchestrates the full flow: every specialist answers the prompt
//! concurrently, then the reviewer debates the collected outputs.
//!
//! Specialist results are processed in completion order. A recoverable
//! failure drops that specialist and the run continues; a fatal one cancels
//! every pending specialist and ends the run without a debate. The event
//! stream always ends with `boomerang_complete`, or with `error` when no
//! specialist answered.

use crate::ports::event_sink::BoomerangEventSink;
use crate::use_cases::agent::{AgentCallResult, AgentError, AgentPool};
use crate::use_cases::debate::DebateController;
use boomerang_domain::{
    BoomerangEvent, BoomerangOutcome, CallKind, DebateOutcome, ExecutionContext, FailureClass,
    FatalKind, RunStatus, SpecialistOutput,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Phase name carried by `phase` progress events during the fan-out
pub const SPECIALIST_PHASE: &str = "specialists";

/// Message of the terminal `error` event
pub const ALL_SPECIALISTS_FAILED: &str = "All specialist agents failed";

/// Input for the RunBoomerang use case
#[derive(Debug, Clone)]
pub struct RunBoomerangInput {
    pub context: ExecutionContext,
    /// Shared prompt every specialist answers
    pub prompt: String,
    /// Stops the run early when cancelled
    pub cancel: Option<CancellationToken>,
}

impl RunBoomerangInput {
    pub fn new(context: ExecutionContext, prompt: impl Into<String>) -> Self {
        Self {
            context,
            prompt: prompt.into(),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Why the fan-out stopped before every specialist settled
enum Interruption {
    Fatal(FatalKind),
    Cancelled,
}

impl Interruption {
    fn report(&self) -> BoomerangEvent {
        match self {
            Interruption::Fatal(kind) => BoomerangEvent::BoomerangError {
                error: kind.as_str().to_string(),
                message: kind.user_message().to_string(),
            },
            Interruption::Cancelled => cancelled_event(),
        }
    }
}

struct FanOut {
    outputs: Vec<SpecialistOutput>,
    failed: Vec<String>,
    interruption: Option<Interruption>,
}

/// Use case for running a Boomerang review
pub struct RunBoomerangUseCase {
    pool: Arc<AgentPool>,
    debate: DebateController,
}

impl RunBoomerangUseCase {
    pub fn new(pool: Arc<AgentPool>) -> Self {
        Self {
            debate: DebateController::new(Arc::clone(&pool)),
            pool,
        }
    }

    /// Execute the use case, reporting every step to `events`.
    ///
    /// Never fails: every failure is reported as an event and reflected in
    /// the outcome's status.
    pub async fn execute(
        &self,
        input: RunBoomerangInput,
        events: &dyn BoomerangEventSink,
    ) -> BoomerangOutcome {
        let context = &input.context;
        let subject_id = context.subject_id;
        events.emit(&BoomerangEvent::BoomerangStart { subject_id });

        // Phase 1: Specialists
        let fan_out = self.phase_specialists(&input, events).await;
        let agents_completed: Vec<String> =
            fan_out.outputs.iter().map(|o| o.agent.clone()).collect();

        let outcome = |status: RunStatus, debate: Option<DebateOutcome>| BoomerangOutcome {
            subject_id,
            status,
            specialist_outputs: fan_out.outputs.clone(),
            failed_agents: fan_out.failed.clone(),
            debate,
        };

        if let Some(interruption) = &fan_out.interruption {
            events.emit(&interruption.report());
            events.emit(&BoomerangEvent::BoomerangComplete {
                subject_id,
                agents_completed,
                aborted: true,
            });
            return outcome(RunStatus::Aborted, None);
        }

        if fan_out.outputs.is_empty() {
            warn!("{}", ALL_SPECIALISTS_FAILED);
            events.emit(&BoomerangEvent::Error {
                error: ALL_SPECIALISTS_FAILED.to_string(),
            });
            return outcome(RunStatus::NoOutputs, None);
        }

        // Phase 2: Debate
        let (status, debate) = self
            .phase_debate(&fan_out.outputs, context, input.cancel.as_ref(), events)
            .await;

        events.emit(&BoomerangEvent::BoomerangComplete {
            subject_id,
            agents_completed,
            aborted: status == RunStatus::Aborted,
        });
        info!("Boomerang finished with status {:?}", status);
        outcome(status, debate)
    }

    /// Run every specialist concurrently and settle them in completion order
    async fn phase_specialists(
        &self,
        input: &RunBoomerangInput,
        events: &dyn BoomerangEventSink,
    ) -> FanOut {
        let specialists: Vec<_> = self.pool.specialists().cloned().collect();
        let total = specialists.len();
        info!("Starting Boomerang with {} specialists", total);

        for agent in &specialists {
            events.emit(&BoomerangEvent::AgentStart {
                agent: agent.name().to_string(),
            });
        }

        let mut join_set = JoinSet::new();
        let mut pending: BTreeSet<String> = BTreeSet::new();
        let mut task_names: HashMap<Id, String> = HashMap::new();

        for agent in specialists {
            let context = input.context.clone();
            let prompt = input.prompt.clone();
            let name = agent.name().to_string();
            pending.insert(name.clone());

            let handle = join_set.spawn(async move {
                let system = agent.system_prompt(&context);
                let result = agent
                    .raw_chat(CallKind::Specialist, &prompt, &system, None, &context)
                    .await;
                (agent, result)
            });
            task_names.insert(handle.id(), name);
        }

        let mut outputs = Vec::new();
        let mut failed = Vec::new();
        let mut interruption = None;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(input.cancel.as_ref()) => {
                    warn!("Boomerang cancelled during specialist phase");
                    interruption = Some(Interruption::Cancelled);
                    break;
                }
                joined = join_set.join_next_with_id() => joined,
            };
            let Some(joined) = joined else { break };

            match joined {
                Ok((_, (agent, Ok(result)))) => {
                    info!("Specialist {} responded", agent.name());
                    pending.remove(agent.name());
                    events.emit(&completed_event(agent.name(), &result));
                    outputs.push(SpecialistOutput {
                        agent: agent.name().to_string(),
                        role: agent.identity().role.clone(),
                        content: result.text,
                    });
                    events.emit(&BoomerangEvent::Phase {
                        phase: SPECIALIST_PHASE.to_string(),
                        completed: outputs.len(),
                        total,
                    });
                }
                Ok((_, (agent, Err(e)))) => {
                    let class = e.classify();
                    warn!("Specialist {} failed ({}): {}", agent.name(), class, e);
                    pending.remove(agent.name());
                    failed.push(agent.name().to_string());
                    events.emit(&error_event(agent.name(), &e, class));

                    if let FailureClass::Fatal(kind) = class {
                        interruption = Some(Interruption::Fatal(kind));
                        break;
                    }
                }
                Err(e) if e.is_cancelled() => {
                    warn!("Task join error: {}", e);
                }
                Err(e) => {
                    // A panicked specialist counts as a recoverable failure
                    let Some(name) = task_names.get(&e.id()).cloned() else {
                        warn!("Task join error: {}", e);
                        continue;
                    };
                    warn!("Specialist {} task failed: {}", name, e);
                    pending.remove(&name);
                    events.emit(&BoomerangEvent::AgentError {
                        agent: name.clone(),
                        error: format!("Specialist task failed: {}", e),
                        classification: FailureClass::Recoverable.tag().to_string(),
                    });
                    failed.push(name);
                }
            }
        }

        if interruption.is_some() {
            // Siblings are not awaited
            join_set.abort_all();
            if !pending.is_empty() {
                info!("Cancelled {} pending specialists", pending.len());
            }
        }
        failed.extend(pending);

        FanOut {
            outputs,
            failed,
            interruption,
        }
    }

    async fn phase_debate(
        &self,
        outputs: &[SpecialistOutput],
        context: &ExecutionContext,
        cancel: Option<&CancellationToken>,
        events: &dyn BoomerangEventSink,
    ) -> (RunStatus, Option<DebateOutcome>) {
        let reviewer = self.pool.reviewer().name().to_string();
        events.emit(&BoomerangEvent::AxiomStart {
            agent: reviewer.clone(),
        });

        let result = tokio::select! {
            biased;
            _ = cancelled(cancel) => {
                warn!("Boomerang cancelled during debate");
                events.emit(&cancelled_event());
                return (RunStatus::Aborted, None);
            }
            result = self.debate.run(outputs, context, events) => result,
        };

        match result {
            Ok(debate) => {
                info!(
                    "Debate finished with {} challenges",
                    debate.challenge_count()
                );
                (RunStatus::Completed, Some(debate))
            }
            Err(e) => {
                let class = e.classify();
                warn!("Debate failed ({}): {}", class, e);
                events.emit(&error_event(&reviewer, &e, class));
                let message = match class {
                    FailureClass::Fatal(kind) => kind.user_message().to_string(),
                    FailureClass::Recoverable => e.to_string(),
                };
                events.emit(&BoomerangEvent::BoomerangError {
                    error: class.tag().to_string(),
                    message,
                });
                let status = if class.is_fatal() {
                    RunStatus::Aborted
                } else {
                    RunStatus::DebateFailed
                };
                (status, None)
            }
        }
    }
}

/// Resolves once `token` is cancelled; never resolves without a token
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

fn cancelled_event() -> BoomerangEvent {
    BoomerangEvent::BoomerangError {
        error: FailureClass::CANCELLED.to_string(),
        message: "Run cancelled before completion".to_string(),
    }
}

fn completed_event(agent: &str, result: &AgentCallResult) -> BoomerangEvent {
    BoomerangEvent::AgentComplete {
        agent: agent.to_string(),
        content: result.text.clone(),
        session_id: result.session_id,
        input_tokens: result.input_tokens,
        output_tokens: result.output_tokens,
        cost_cents: result.cost_cents,
    }
}

fn error_event(agent: &str, error: &AgentError, class: FailureClass) -> BoomerangEvent {
    BoomerangEvent::AgentError {
        agent: agent.to_string(),
        error: error.to_string(),
        classification: class.tag().to_string(),
    }
}
