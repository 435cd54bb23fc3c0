// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared per-item loop behind every strategy.

use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use switchyard_config::model::{CostConfig, RunConfig};
use switchyard_core::{normalize_label, Article, SwitchyardError};
use switchyard_cost::{CostTally, ModelPricing};
use tracing::{debug, info};

use crate::stats::{DecisionSource, RunRecord, RunStats};
use crate::strategy::ClassificationStrategy;

/// Runs a strategy over a batch and aggregates the outcome.
///
/// With `concurrency > 1` up to that many items are in flight; records
/// still come back in input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchRunner {
    concurrency: usize,
    pricing: ModelPricing,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            pricing: ModelPricing::default(),
        }
    }

    pub fn from_config(run: &RunConfig, cost: &CostConfig) -> Self {
        Self::new(run.concurrency).with_pricing(ModelPricing::from(cost))
    }

    /// Pricing used for the spend totals logged after each batch.
    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run(
        &self,
        articles: &[Article],
        strategy: &dyn ClassificationStrategy,
    ) -> Result<RunStats, SwitchyardError> {
        info!(
            strategy = strategy.name(),
            items = articles.len(),
            concurrency = self.concurrency,
            "starting batch"
        );

        let records: Vec<RunRecord> = stream::iter(articles.iter().map(|a| classify_one(strategy, a)))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut tally = CostTally::new();
        for record in records.iter().filter(|r| r.source == DecisionSource::Fallback) {
            tally.record(&record.usage, &self.pricing);
        }
        tally.log(strategy.name());

        let stats = RunStats::from_records(records);
        info!(
            strategy = strategy.name(),
            accuracy = stats.accuracy,
            total_cost = stats.total_cost,
            mean_latency_seconds = stats.mean_latency_seconds,
            router_hits = stats.router_hits(),
            fallback_calls = stats.fallback_calls(),
            "batch complete"
        );
        Ok(stats)
    }
}

async fn classify_one(
    strategy: &dyn ClassificationStrategy,
    article: &Article,
) -> Result<RunRecord, SwitchyardError> {
    let started = Instant::now();
    let decision = strategy.decide(article).await?;
    let elapsed_seconds = started.elapsed().as_secs_f64();

    let truth = normalize_label(&article.category);
    let correct = !truth.is_empty() && decision.predicted_label == truth;
    debug!(
        article = %article.id,
        predicted = %decision.predicted_label,
        source = %decision.source,
        correct,
        "item classified"
    );

    Ok(RunRecord {
        article_id: article.id.clone(),
        predicted_label: decision.predicted_label,
        truth,
        source: decision.source,
        elapsed_seconds,
        cost: decision.cost,
        usage: decision.usage,
        correct,
    })
}
