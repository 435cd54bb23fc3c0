// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing and cost calculation.
//!
//! Default rates match the hosted Llama 3.1 8B Instruct endpoint:
//! input=$0.09/MTok, output=$0.29/MTok.

use serde::Serialize;
use switchyard_config::model::CostConfig;
use switchyard_core::TokenUsage;

/// Pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPricing {
    /// Cost per million input (prompt) tokens.
    pub input_per_mtok: f64,
    /// Cost per million output (completion) tokens.
    pub output_per_mtok: f64,
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

impl From<&CostConfig> for ModelPricing {
    fn from(config: &CostConfig) -> Self {
        Self {
            input_per_mtok: config.input_per_mtok,
            output_per_mtok: config.output_per_mtok,
        }
    }
}

/// Calculate cost in USD for a given token usage and pricing.
///
/// Formula: (tokens / 1_000_000) * price_per_million, summed over input and output.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let input = (usage.prompt_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (usage.completion_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    input + output
}
