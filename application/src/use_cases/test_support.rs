//! Test doubles shared by the use case tests.

use crate::ports::event_sink::BoomerangEventSink;
use crate::ports::llm_gateway::{
    Completion, CompletionRequest, GatewayError, LlmGateway, StreamHandle,
};
use crate::ports::repository::{DecisionRepository, RepositoryError};
use async_trait::async_trait;
use boomerang_domain::{
    BoomerangEvent, ChallengeRecord, SessionRecord, StreamEvent, UsageRecord, VerdictRecord,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const INPUT_TOKENS: u32 = 1200;
pub const OUTPUT_TOKENS: u32 = 300;

/// A scripted reply for one call
#[derive(Clone)]
pub enum Scripted {
    /// Return text
    Reply(String),
    /// Return an error
    Error(GatewayError),
    /// Wait, then behave like the inner script
    Delayed(Duration, Box<Scripted>),
    /// Stream these chunks, then complete
    Chunks(Vec<String>),
    /// Stream a partial chunk, then fail
    BrokenStream(String, GatewayError),
}

/// Mock gateway with a queue of scripted replies per agent
pub struct ScriptedGateway {
    queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(&self, agent: &str, reply: Scripted) -> &Self {
        self.queues
            .lock()
            .unwrap()
            .entry(agent.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn reply(&self, agent: &str, text: &str) -> &Self {
        self.script(agent, Scripted::Reply(text.to_string()))
    }

    pub fn fail(&self, agent: &str, error: GatewayError) -> &Self {
        self.script(agent, Scripted::Error(error))
    }

    pub fn delayed(&self, agent: &str, delay: Duration, text: &str) -> &Self {
        self.script(
            agent,
            Scripted::Delayed(delay, Box::new(Scripted::Reply(text.to_string()))),
        )
    }

    /// Every request received, in arrival order
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> Vec<CompletionRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.agent == agent)
            .collect()
    }

    fn next(&self, request: &CompletionRequest) -> Scripted {
        self.calls.lock().unwrap().push(request.clone());
        self.queues
            .lock()
            .unwrap()
            .get_mut(&request.agent)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Scripted::Reply(format!("(default response from {})", request.agent)))
    }
}

async fn settle(mut script: Scripted) -> Scripted {
    while let Scripted::Delayed(delay, inner) = script {
        tokio::time::sleep(delay).await;
        script = *inner;
    }
    script
}

fn completion(text: String) -> Completion {
    Completion {
        text,
        input_tokens: INPUT_TOKENS,
        output_tokens: OUTPUT_TOKENS,
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError> {
        match settle(self.next(request)).await {
            Scripted::Reply(text) => Ok(completion(text)),
            Scripted::Chunks(chunks) => Ok(completion(chunks.concat())),
            Scripted::Error(e) => Err(e),
            Scripted::BrokenStream(_, e) => Err(e),
            Scripted::Delayed(..) => unreachable!(),
        }
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<StreamHandle, GatewayError> {
        let events = match settle(self.next(request)).await {
            Scripted::Reply(text) => vec![StreamEvent::Delta(text)],
            Scripted::Chunks(chunks) => chunks.into_iter().map(StreamEvent::Delta).collect(),
            Scripted::Error(e) => return Err(e),
            Scripted::BrokenStream(partial, e) => {
                vec![StreamEvent::Delta(partial), e.to_stream_event()]
            }
            Scripted::Delayed(..) => unreachable!(),
        };
        let failed = matches!(events.last(), Some(StreamEvent::Error { .. }));

        let (tx, rx) = mpsc::channel(events.len() + 1);
        for event in events {
            tx.send(event).await.unwrap();
        }
        if !failed {
            tx.send(StreamEvent::Completed {
                input_tokens: INPUT_TOKENS,
                output_tokens: OUTPUT_TOKENS,
            })
            .await
            .unwrap();
        }
        Ok(StreamHandle::new(rx))
    }
}

/// In-memory repository
#[derive(Default)]
pub struct MemoryRepository {
    pub sessions: Mutex<Vec<SessionRecord>>,
    pub challenges: Mutex<Vec<ChallengeRecord>>,
    pub usage: Mutex<Vec<UsageRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn challenges(&self) -> Vec<ChallengeRecord> {
        self.challenges.lock().unwrap().clone()
    }

    pub fn usage(&self) -> Vec<UsageRecord> {
        self.usage.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionRepository for MemoryRepository {
    async fn insert_session(&self, record: SessionRecord) -> Result<Uuid, RepositoryError> {
        let id = record.id;
        self.sessions.lock().unwrap().push(record);
        Ok(id)
    }

    async fn insert_challenge(&self, record: ChallengeRecord) -> Result<Uuid, RepositoryError> {
        let id = record.id;
        self.challenges.lock().unwrap().push(record);
        Ok(id)
    }

    async fn insert_verdict(
        &self,
        challenge_id: Uuid,
        verdict: VerdictRecord,
    ) -> Result<(), RepositoryError> {
        let mut challenges = self.challenges.lock().unwrap();
        let challenge = challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
            .ok_or(RepositoryError::ChallengeNotFound(challenge_id))?;
        if challenge.verdict.is_some() {
            return Err(RepositoryError::VerdictExists(challenge_id));
        }
        challenge.verdict = Some(verdict);
        Ok(())
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), RepositoryError> {
        self.usage.lock().unwrap().push(record);
        Ok(())
    }

    async fn latest_sessions_per_agent(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        let mut latest: Vec<SessionRecord> = Vec::new();
        for record in self.sessions.lock().unwrap().iter() {
            if record.subject_id != subject_id || !record.kind.is_opinion() {
                continue;
            }
            match latest.iter_mut().find(|r| r.agent == record.agent) {
                Some(existing) if record.created_at >= existing.created_at => {
                    *existing = record.clone()
                }
                Some(_) => {}
                None => latest.push(record.clone()),
            }
        }
        Ok(latest)
    }

    async fn challenges_ordered(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<ChallengeRecord>, RepositoryError> {
        let mut challenges: Vec<_> = self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.subject_id == subject_id)
            .cloned()
            .collect();
        challenges.sort_by_key(|c| c.created_at);
        Ok(challenges)
    }
}

/// Sink that keeps every event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BoomerangEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BoomerangEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(BoomerangEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| **n == name).count()
    }
}

impl BoomerangEventSink for RecordingSink {
    fn emit(&self, event: &BoomerangEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
