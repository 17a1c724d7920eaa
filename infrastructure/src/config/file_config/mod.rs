//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application settings.

mod agent;
mod provider;
mod storage;

pub use agent::FileAgentConfig;
pub use provider::FileProviderConfig;
pub use storage::{FileEventsConfig, FileStorageConfig};

use boomerang_application::AgentSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider.model cannot be empty")]
    EmptyModelName,

    #[error("provider.max_tokens cannot be 0")]
    InvalidMaxTokens,

    #[error("agent.{0} cannot be negative")]
    NegativeRate(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model provider connection
    pub provider: FileProviderConfig,
    /// Prompt version and pricing
    pub agent: FileAgentConfig,
    /// Decision journal
    pub storage: FileStorageConfig,
    /// Event log
    pub events: FileEventsConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.provider.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.provider.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }
        if self.agent.input_cents_per_mtok < 0.0 {
            return Err(ConfigValidationError::NegativeRate("input_cents_per_mtok"));
        }
        if self.agent.output_cents_per_mtok < 0.0 {
            return Err(ConfigValidationError::NegativeRate("output_cents_per_mtok"));
        }
        Ok(())
    }

    /// Settings applied to every agent call
    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings::default()
            .with_model(self.provider.model.clone())
            .with_max_tokens(self.provider.max_tokens)
            .with_call_timeout(Duration::from_secs(self.provider.timeout_seconds))
            .with_prompt_version(self.agent.prompt_version.clone())
            .with_rates(self.agent.rates())
    }

    /// Render the effective configuration as TOML (for `config show`)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        if redacted.provider.api_key.is_some() {
            redacted.provider.api_key = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&redacted)
    }
}
