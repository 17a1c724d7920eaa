//! Token-based pricing.

use serde::{Deserialize, Serialize};

/// Per-million-token prices in cents for the active model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenRates {
    pub input_cents_per_mtok: f64,
    pub output_cents_per_mtok: f64,
}

impl TokenRates {
    /// $0.25 / MTok in, $1.25 / MTok out
    pub const DEFAULT: TokenRates = TokenRates {
        input_cents_per_mtok: 25.0,
        output_cents_per_mtok: 125.0,
    };

    pub fn new(input_cents_per_mtok: f64, output_cents_per_mtok: f64) -> Self {
        Self {
            input_cents_per_mtok,
            output_cents_per_mtok,
        }
    }

    /// Cost of a call in cents, rounded to 4 decimal places
    pub fn cost_cents(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let raw = (input_tokens as f64 * self.input_cents_per_mtok
            + output_tokens as f64 * self.output_cents_per_mtok)
            / 1_000_000.0;
        round4(raw)
    }
}

impl Default for TokenRates {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
