//! Agent settings: per-call parameters shared by the panel.
//!
//! These are application-layer concerns, not domain policy: they decide
//! which model is called and how long a call may take.

use boomerang_domain::TokenRates;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model used when nothing is configured
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Parameters applied to every agent call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Provider model identifier
    pub model: String,
    /// Tag stored with every session to identify the prompt set
    pub prompt_version: String,
    /// Default `max_tokens` for calls that do not set their own
    pub max_tokens: u32,
    /// Pricing used for session and usage cost
    pub rates: TokenRates,
    /// Upper bound on one raw call, and on the silence between two stream
    /// deltas
    pub call_timeout: Duration,
    /// Service label on usage records
    pub usage_service: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt_version: "v1".to_string(),
            max_tokens: 4096,
            rates: TokenRates::default(),
            call_timeout: Duration::from_secs(120),
            usage_service: "claude".to_string(),
        }
    }
}

impl AgentSettings {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt_version(mut self, version: impl Into<String>) -> Self {
        self.prompt_version = version.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_rates(mut self, rates: TokenRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}
