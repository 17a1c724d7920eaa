//! Agent configuration from TOML (`[agent]` section)

use boomerang_domain::TokenRates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Tag stored with every session (default: "v1")
    pub prompt_version: String,
    /// Cents per million input tokens
    pub input_cents_per_mtok: f64,
    /// Cents per million output tokens
    pub output_cents_per_mtok: f64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let rates = TokenRates::default();
        Self {
            prompt_version: "v1".to_string(),
            input_cents_per_mtok: rates.input_cents_per_mtok,
            output_cents_per_mtok: rates.output_cents_per_mtok,
        }
    }
}

impl FileAgentConfig {
    pub fn rates(&self) -> TokenRates {
        TokenRates::new(self.input_cents_per_mtok, self.output_cents_per_mtok)
    }
}
