//! Provider configuration from TOML (`[provider]` section)

use crate::anthropic::gateway::{AnthropicConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use boomerang_application::config::agent_settings::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// Model identifier used by every agent.
    pub model: String,
    /// Default max tokens per response.
    pub max_tokens: u32,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            timeout_seconds: 120,
        }
    }
}

impl FileProviderConfig {
    /// The inline key if set, otherwise the value of `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }

    /// Gateway settings for a resolved key.
    ///
    /// The HTTP timeout sits above the per-call timeout so the caller's
    /// timer fires first.
    pub fn anthropic_config(&self, api_key: String) -> AnthropicConfig {
        AnthropicConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_api_version(self.api_version.clone())
            .with_request_timeout(Duration::from_secs(self.timeout_seconds.saturating_mul(2)))
    }
}
