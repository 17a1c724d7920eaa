//! Agent use case
//!
//! An [`Agent`] is one panel identity bound to the model provider and the
//! decision repository. Every successful call, streaming or raw, leaves
//! exactly one session record behind (plus a usage record when the context
//! is attributed).

use crate::config::AgentSettings;
use crate::ports::llm_gateway::{Completion, CompletionRequest, GatewayError, LlmGateway};
use crate::ports::repository::{DecisionRepository, RepositoryError};
use boomerang_domain::{
    AgentIdentity, AgentPromptTemplate, AgentRegistry, CallKind, ChatEvent, ExecutionContext,
    FailureClass, SessionRecord, StreamEvent, UsageRecord,
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors raised by agent calls
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Provider error: {0}")]
    Provider(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl AgentError {
    /// Provider errors carry their own classification; everything else is
    /// confined to the failing call.
    pub fn classify(&self) -> FailureClass {
        match self {
            AgentError::Provider(e) => e.classify(),
            _ => FailureClass::Recoverable,
        }
    }
}

/// Output of one model invocation, after it was persisted
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCallResult {
    pub session_id: Uuid,
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_cents: f64,
    pub duration_ms: u64,
}

/// Receiving end of a streaming chat
pub struct ChatStream {
    receiver: mpsc::Receiver<ChatEvent>,
}

impl ChatStream {
    pub fn new(receiver: mpsc::Receiver<ChatEvent>) -> Self {
        Self { receiver }
    }

    /// Next event; `None` after the terminal `done` or `error`
    pub async fn next(&mut self) -> Option<ChatEvent> {
        self.receiver.recv().await
    }

    /// Drain the stream
    pub async fn collect(mut self) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}

/// A single named persona backed by the model provider
#[derive(Clone)]
pub struct Agent {
    identity: AgentIdentity,
    panel_size: usize,
    gateway: Arc<dyn LlmGateway>,
    repository: Arc<dyn DecisionRepository>,
    settings: Arc<AgentSettings>,
}

impl Agent {
    pub fn new(
        identity: AgentIdentity,
        panel_size: usize,
        gateway: Arc<dyn LlmGateway>,
        repository: Arc<dyn DecisionRepository>,
        settings: Arc<AgentSettings>,
    ) -> Self {
        Self {
            identity,
            panel_size,
            gateway,
            repository,
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    /// System instruction for this agent in `context`
    pub fn system_prompt(&self, context: &ExecutionContext) -> String {
        AgentPromptTemplate::system_prompt(
            &self.identity,
            self.panel_size,
            context.dimension,
            context.phase,
        )
    }

    /// Non-streaming call.
    ///
    /// Provider errors (including the per-call timeout) are returned to the
    /// caller untouched so it can decide between fatal and recoverable.
    pub async fn raw_chat(
        &self,
        kind: CallKind,
        message: &str,
        system_prompt: &str,
        max_tokens: Option<u32>,
        context: &ExecutionContext,
    ) -> Result<AgentCallResult, AgentError> {
        let request = self.request(message, system_prompt, max_tokens);
        info!(
            "raw_chat [{}] {} calling model={} prompt_len={} max_tokens={}",
            self.name(),
            kind,
            request.model,
            message.len(),
            request.max_tokens
        );

        let start = Instant::now();
        let completion = match timeout(self.settings.call_timeout, self.gateway.complete(&request))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "raw_chat [{}] timed out after {:?}",
                    self.name(),
                    self.settings.call_timeout
                );
                return Err(GatewayError::Timeout.into());
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        if completion.text.is_empty() {
            warn!("raw_chat [{}] returned an empty response", self.name());
        }
        info!(
            "raw_chat [{}] done tokens_in={} tokens_out={} duration_ms={}",
            self.name(),
            completion.input_tokens,
            completion.output_tokens,
            duration_ms
        );

        let payload = json!({
            "type": kind.as_str(),
            "prompt": message,
            "system": system_prompt,
        });
        self.record(kind, context, payload, completion, duration_ms)
            .await
    }

    /// Streaming chat.
    ///
    /// Deltas are forwarded as `token` events as soon as they arrive. The
    /// stream ends with `done` once the session is persisted, or with `error`
    /// if the provider fails; tokens already sent are not retracted.
    pub fn chat(&self, message: impl Into<String>, context: &ExecutionContext) -> ChatStream {
        let (tx, rx) = mpsc::channel(64);
        let agent = self.clone();
        let context = context.clone();
        let message = message.into();

        tokio::spawn(async move {
            if let Err(e) = agent.run_chat(&message, &context, &tx).await {
                warn!("chat [{}] failed: {}", agent.name(), e);
                let _ = tx
                    .send(ChatEvent::Error {
                        agent: agent.name().to_string(),
                        error: e.to_string(),
                        classification: e.classify().tag().to_string(),
                    })
                    .await;
            }
        });

        ChatStream::new(rx)
    }

    async fn run_chat(
        &self,
        message: &str,
        context: &ExecutionContext,
        tx: &mpsc::Sender<ChatEvent>,
    ) -> Result<(), AgentError> {
        let system_prompt = self.system_prompt(context);
        let request = self.request(message, &system_prompt, None);
        let idle = self.settings.call_timeout;
        info!(
            "chat [{}] streaming model={} message_len={}",
            self.name(),
            request.model,
            message.len()
        );

        let start = Instant::now();
        let mut handle = timeout(idle, self.gateway.stream(&request))
            .await
            .map_err(|_| GatewayError::Timeout)??;

        let mut text = String::new();
        let (input_tokens, output_tokens) = loop {
            let event = timeout(idle, handle.recv())
                .await
                .map_err(|_| GatewayError::Timeout)?;
            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    text.push_str(&chunk);
                    let token = ChatEvent::Token {
                        agent: self.name().to_string(),
                        content: chunk,
                    };
                    if tx.send(token).await.is_err() {
                        debug!("chat [{}] receiver dropped, abandoning stream", self.name());
                        return Ok(());
                    }
                }
                Some(StreamEvent::Completed {
                    input_tokens,
                    output_tokens,
                }) => break (input_tokens, output_tokens),
                Some(StreamEvent::Error {
                    classification,
                    message,
                }) => return Err(GatewayError::from_stream_failure(classification, message).into()),
                None => return Err(GatewayError::TransportClosed.into()),
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        if text.is_empty() {
            warn!("chat [{}] returned an empty response", self.name());
        }

        let payload = json!({ "message": message, "system": system_prompt });
        let completion = Completion {
            text,
            input_tokens,
            output_tokens,
        };
        let result = self
            .record(CallKind::Chat, context, payload, completion, duration_ms)
            .await?;

        let _ = tx
            .send(ChatEvent::Done {
                agent: self.name().to_string(),
                session_id: result.session_id,
                input_tokens: result.input_tokens,
                output_tokens: result.output_tokens,
                cost_cents: result.cost_cents,
                duration_ms: result.duration_ms,
            })
            .await;
        Ok(())
    }

    fn request(
        &self,
        message: &str,
        system_prompt: &str,
        max_tokens: Option<u32>,
    ) -> CompletionRequest {
        CompletionRequest {
            agent: self.name().to_string(),
            model: self.settings.model.clone(),
            system_prompt: system_prompt.to_string(),
            message: message.to_string(),
            max_tokens: max_tokens.unwrap_or(self.settings.max_tokens),
        }
    }

    /// Persist the session (and usage when attributed)
    async fn record(
        &self,
        kind: CallKind,
        context: &ExecutionContext,
        request_payload: Value,
        completion: Completion,
        duration_ms: u64,
    ) -> Result<AgentCallResult, AgentError> {
        let cost_cents = self
            .settings
            .rates
            .cost_cents(completion.input_tokens, completion.output_tokens);

        let session = SessionRecord {
            id: Uuid::new_v4(),
            subject_id: context.subject_id,
            agent: self.name().to_string(),
            kind,
            model: self.settings.model.clone(),
            prompt_version: self.settings.prompt_version.clone(),
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            cost_cents,
            request_payload,
            response_payload: json!({ "content": completion.text }),
            duration_ms,
            created_at: Utc::now(),
        };
        let session_id = self.repository.insert_session(session).await?;

        if let Some((organization_id, user_id)) = context.attribution() {
            self.repository
                .insert_usage(UsageRecord {
                    id: Uuid::new_v4(),
                    organization_id,
                    user_id,
                    service: self.settings.usage_service.clone(),
                    model: self.settings.model.clone(),
                    input_tokens: completion.input_tokens,
                    output_tokens: completion.output_tokens,
                    cost_cents,
                    endpoint: kind.endpoint(self.name()),
                    created_at: Utc::now(),
                })
                .await?;
        }

        Ok(AgentCallResult {
            session_id,
            text: completion.text,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            cost_cents,
            duration_ms,
        })
    }
}

/// Every agent of the registry, bound to the same gateway and repository
pub struct AgentPool {
    registry: Arc<AgentRegistry>,
    agents: Vec<Agent>,
    reviewer: usize,
    repository: Arc<dyn DecisionRepository>,
}

impl AgentPool {
    pub fn new(
        registry: Arc<AgentRegistry>,
        gateway: Arc<dyn LlmGateway>,
        repository: Arc<dyn DecisionRepository>,
        settings: AgentSettings,
    ) -> Self {
        let settings = Arc::new(settings);
        let agents: Vec<Agent> = registry
            .iter()
            .map(|identity| {
                Agent::new(
                    identity.clone(),
                    registry.len(),
                    Arc::clone(&gateway),
                    Arc::clone(&repository),
                    Arc::clone(&settings),
                )
            })
            .collect();
        let reviewer = registry
            .iter()
            .position(AgentIdentity::is_reviewer)
            .unwrap_or_default();

        Self {
            registry,
            agents,
            reviewer,
            repository,
        }
    }

    pub fn get(&self, name: &str) -> Result<&Agent, AgentError> {
        self.agents
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| AgentError::UnknownAgent(name.to_string()))
    }

    pub fn reviewer(&self) -> &Agent {
        &self.agents[self.reviewer]
    }

    /// Specialists in registry order
    pub fn specialists(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| !a.identity().is_reviewer())
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &Arc<dyn DecisionRepository> {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        INPUT_TOKENS, MemoryRepository, OUTPUT_TOKENS, Scripted, ScriptedGateway,
    };
    use boomerang_domain::{Dimension, FatalKind, ProcessPhase};
    use std::time::Duration;

    fn pool(gateway: Arc<ScriptedGateway>, repo: Arc<MemoryRepository>) -> AgentPool {
        AgentPool::new(
            Arc::new(AgentRegistry::standard()),
            gateway,
            repo,
            AgentSettings::default(),
        )
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(Uuid::new_v4())
            .with_dimension(Dimension::Design)
            .with_phase(ProcessPhase::Review)
    }

    #[tokio::test]
    async fn test_raw_chat_persists_session() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply("dex", "Requirements look thin.");
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway.clone(), repo.clone());
        let ctx = context();

        let dex = pool.get("dex").unwrap();
        let system = dex.system_prompt(&ctx);
        let result = dex
            .raw_chat(CallKind::Specialist, "Assess this", &system, None, &ctx)
            .await
            .unwrap();

        assert_eq!(result.text, "Requirements look thin.");
        assert_eq!(result.input_tokens, INPUT_TOKENS);
        assert!((result.cost_cents - 0.0675).abs() < 1e-12);

        let sessions = repo.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, result.session_id);
        assert_eq!(sessions[0].agent, "dex");
        assert_eq!(sessions[0].kind, CallKind::Specialist);
        assert_eq!(sessions[0].prompt_version, "v1");
        assert_eq!(sessions[0].content(), "Requirements look thin.");
        assert_eq!(sessions[0].subject_id, ctx.subject_id);

        let call = &gateway.calls_for("dex")[0];
        assert!(call.system_prompt.contains("Shaping"));
        assert_eq!(call.max_tokens, 4096);
    }

    #[tokio::test]
    async fn test_usage_only_with_attribution() {
        let gateway = Arc::new(ScriptedGateway::new());
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());
        let lyra = pool.get("lyra").unwrap();

        lyra.raw_chat(CallKind::Specialist, "a", "s", None, &context())
            .await
            .unwrap();
        assert!(repo.usage().is_empty());

        let attributed = context().with_attribution(Uuid::new_v4(), Uuid::new_v4());
        lyra.raw_chat(CallKind::Specialist, "a", "s", Some(512), &attributed)
            .await
            .unwrap();
        let usage = repo.usage();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].endpoint, "boomerang/specialist/lyra");
        assert_eq!(usage[0].service, "claude");
        assert_eq!(usage[0].output_tokens, OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn test_raw_chat_propagates_provider_error() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.fail("mira", GatewayError::CreditExhausted("balance too low".into()));
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());

        let err = pool
            .get("mira")
            .unwrap()
            .raw_chat(CallKind::Specialist, "a", "s", None, &context())
            .await
            .unwrap_err();
        assert_eq!(err.classify(), FailureClass::Fatal(FatalKind::CreditBalance));
        assert!(repo.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_raw_chat_times_out() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.delayed("vela", Duration::from_secs(600), "too late");
        let repo = Arc::new(MemoryRepository::new());
        let pool = AgentPool::new(
            Arc::new(AgentRegistry::standard()),
            gateway,
            repo,
            AgentSettings::default().with_call_timeout(Duration::from_secs(1)),
        );

        let err = pool
            .get("vela")
            .unwrap()
            .raw_chat(CallKind::Specialist, "a", "s", None, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Provider(GatewayError::Timeout)));
        assert_eq!(err.classify(), FailureClass::Recoverable);
    }

    #[tokio::test]
    async fn test_empty_response_is_not_an_error() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply("koda", "");
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());

        let result = pool
            .get("koda")
            .unwrap()
            .raw_chat(CallKind::Specialist, "a", "s", None, &context())
            .await
            .unwrap();
        assert!(result.text.is_empty());
        assert_eq!(repo.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let pool = pool(
            Arc::new(ScriptedGateway::new()),
            Arc::new(MemoryRepository::new()),
        );
        let err = pool.get("zed").err().unwrap();
        assert!(matches!(err, AgentError::UnknownAgent(ref n) if n == "zed"));
    }

    #[tokio::test]
    async fn test_chat_streams_tokens_then_done() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script(
            "halo",
            Scripted::Chunks(vec!["Hel".to_string(), "lo".to_string()]),
        );
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());

        let events = pool.get("halo").unwrap().chat("hi", &context()).collect().await;
        let names: Vec<_> = events.iter().map(ChatEvent::name).collect();
        assert_eq!(names, vec!["token", "token", "done"]);
        assert_eq!(
            events[0],
            ChatEvent::Token {
                agent: "halo".to_string(),
                content: "Hel".to_string()
            }
        );

        let sessions = repo.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].kind, CallKind::Chat);
        assert_eq!(sessions[0].content(), "Hello");
        match &events[2] {
            ChatEvent::Done { session_id, .. } => assert_eq!(*session_id, sessions[0].id),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_error_mid_stream_keeps_partial_tokens() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script(
            "nova",
            Scripted::BrokenStream(
                "Part".to_string(),
                GatewayError::RequestFailed("overloaded".to_string()),
            ),
        );
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());

        let events = pool.get("nova").unwrap().chat("hi", &context()).collect().await;
        let names: Vec<_> = events.iter().map(ChatEvent::name).collect();
        assert_eq!(names, vec!["token", "error"]);
        assert!(matches!(
            &events[1],
            ChatEvent::Error { classification, .. } if classification == "recoverable"
        ));
        assert!(repo.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_chat_credit_error_mid_stream_stays_fatal() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script(
            "vela",
            Scripted::BrokenStream(
                "Part".to_string(),
                GatewayError::CreditExhausted("Your credit balance is too low".to_string()),
            ),
        );
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());

        let events = pool.get("vela").unwrap().chat("hi", &context()).collect().await;
        match &events[1] {
            ChatEvent::Error {
                agent,
                error,
                classification,
            } => {
                assert_eq!(agent, "vela");
                assert_eq!(classification, "credit_balance");
                assert_eq!(
                    error,
                    "Provider error: Credit balance exhausted: Your credit balance is too low"
                );
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(repo.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_chat_records_usage_as_chat_endpoint() {
        let gateway = Arc::new(ScriptedGateway::new());
        let repo = Arc::new(MemoryRepository::new());
        let pool = pool(gateway, repo.clone());
        let ctx = context().with_attribution(Uuid::new_v4(), Uuid::new_v4());

        pool.get("rex").unwrap().chat("hi", &ctx).collect().await;
        assert_eq!(repo.usage()[0].endpoint, "chat/rex");
    }

    #[test]
    fn test_pool_layout() {
        let pool = pool(
            Arc::new(ScriptedGateway::new()),
            Arc::new(MemoryRepository::new()),
        );
        assert_eq!(pool.reviewer().name(), "axiom");
        assert_eq!(pool.specialists().count(), 8);
        assert_eq!(pool.specialists().next().unwrap().name(), "lyra");
    }
}
