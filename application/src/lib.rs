//! Application layer for boomerang
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::AgentSettings;
pub use ports::{
    event_sink::{BoomerangEventSink, ChannelEventSink, CompositeEventSink, NoEvents},
    llm_gateway::{Completion, CompletionRequest, GatewayError, LlmGateway, StreamHandle},
    repository::{DecisionRepository, RepositoryError},
};
pub use use_cases::agent::{Agent, AgentCallResult, AgentError, AgentPool, ChatStream};
pub use use_cases::assess::AssessUseCase;
pub use use_cases::debate::{DebateController, DebateError};
pub use use_cases::run_boomerang::{RunBoomerangInput, RunBoomerangUseCase};
pub use use_cases::synopsis::{GenerateSynopsisUseCase, Synopsis, SynopsisError};
