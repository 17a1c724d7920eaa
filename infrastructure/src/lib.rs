//! Infrastructure layer for boomerang
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Anthropic gateway, the journaled decision
//! store, the JSONL event log, and configuration file loading.

pub mod anthropic;
pub mod config;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use anthropic::{AnthropicConfig, AnthropicGateway};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileEventsConfig,
    FileProviderConfig, FileStorageConfig,
};
pub use logging::JsonlEventLog;
pub use persistence::DecisionStore;
