// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running spend totals for one batch.

use serde::Serialize;
use switchyard_core::TokenUsage;
use tracing::info;

use crate::pricing::{calculate_cost, ModelPricing};

/// In-memory totals of billed fallback calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostTally {
    pub calls: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_usd: f64,
}

impl CostTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one billed call and returns its cost.
    pub fn record(&mut self, usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
        let cost = calculate_cost(usage, pricing);
        self.calls += 1;
        self.prompt_tokens += u64::from(usage.prompt_tokens);
        self.completion_tokens += u64::from(usage.completion_tokens);
        self.total_usd += cost;
        cost
    }

    /// Emits the totals at info level under `label`.
    pub fn log(&self, label: &str) {
        info!(
            strategy = label,
            calls = self.calls,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            total_usd = self.total_usd,
            "fallback spend"
        );
    }
}
