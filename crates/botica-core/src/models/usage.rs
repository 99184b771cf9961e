//! Token accounting for model calls. Logged per generation, never stored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TokenCount {
    pub input: u64,
    pub output: u64,
}

impl TokenCount {
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TokenUsage {
    pub tokens: TokenCount,
    /// Zero when the model has no known price.
    pub cost_usd: f64,
}

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    pub fn usage(&self, tokens: TokenCount) -> TokenUsage {
        let per_token = |count: u64, per_million: f64| count as f64 * per_million / 1_000_000.0;
        TokenUsage {
            tokens,
            cost_usd: per_token(tokens.input, self.input_per_million)
                + per_token(tokens.output, self.output_per_million),
        }
    }
}
