//! Anthropic Messages API adapter
//!
//! Implements the [`LlmGateway`](boomerang_application::LlmGateway) port over
//! `reqwest`, both as a single JSON round-trip and as a server-sent event
//! stream.

pub mod gateway;
pub mod types;

pub use gateway::{AnthropicConfig, AnthropicGateway};
