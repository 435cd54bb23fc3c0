// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification strategies: fallback-only baseline and router-first hybrid.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use switchyard_core::{
    normalize_label, Article, FallbackClassifier, SwitchyardError, TokenUsage,
};
use switchyard_cost::{calculate_cost, ModelPricing};
use switchyard_router::SimilarityRouter;
use tracing::{debug, warn};

use crate::stats::DecisionSource;

/// What a strategy decided for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Normalized label; empty when the fallback produced nothing usable.
    pub predicted_label: String,
    pub source: DecisionSource,
    pub usage: TokenUsage,
    pub cost: f64,
}

impl Decision {
    fn routed(label: &str) -> Self {
        Self {
            predicted_label: normalize_label(label),
            source: DecisionSource::Router,
            usage: TokenUsage::default(),
            cost: 0.0,
        }
    }
}

/// Decides one article at a time. Errors returned here abort the batch;
/// per-item failures must already be folded into a [`Decision`].
#[async_trait]
pub trait ClassificationStrategy: Send + Sync {
    /// Name used in logs and summaries.
    fn name(&self) -> &str;

    async fn decide(&self, article: &Article) -> Result<Decision, SwitchyardError>;
}

/// Calls the generative fallback and absorbs per-item failures.
///
/// Malformed answers keep their billed cost with an empty prediction;
/// transport failures and timeouts cost nothing.
#[derive(Clone)]
pub struct FallbackPolicy {
    classifier: Arc<dyn FallbackClassifier>,
    pricing: ModelPricing,
    timeout: Option<Duration>,
}

impl FallbackPolicy {
    pub fn new(classifier: Arc<dyn FallbackClassifier>, pricing: ModelPricing) -> Self {
        Self {
            classifier,
            pricing,
            timeout: None,
        }
    }

    /// Bounds every fallback call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pricing(&self) -> &ModelPricing {
        &self.pricing
    }

    pub async fn decide(&self, article: &Article) -> Result<Decision, SwitchyardError> {
        let call = self.classifier.classify(&article.text);
        let outcome = match self.timeout {
            Some(duration) => tokio::time::timeout(duration, call)
                .await
                .unwrap_or(Err(SwitchyardError::Timeout { duration })),
            None => call.await,
        };

        match outcome {
            Ok(response) => {
                let cost = calculate_cost(&response.usage, &self.pricing);
                let predicted_label = match response.predicted_label {
                    Some(label) => normalize_label(&label),
                    None => {
                        warn!(article = %article.id, "malformed fallback response, scoring incorrect");
                        String::new()
                    }
                };
                Ok(Decision {
                    predicted_label,
                    source: DecisionSource::Fallback,
                    usage: response.usage,
                    cost,
                })
            }
            Err(err) if err.is_item_scoped() => {
                warn!(article = %article.id, error = %err, "fallback call failed, scoring incorrect");
                Ok(Decision {
                    predicted_label: String::new(),
                    source: DecisionSource::Fallback,
                    usage: TokenUsage::default(),
                    cost: 0.0,
                })
            }
            Err(err) => Err(err),
        }
    }
}

/// Sends every article to the generative fallback.
pub struct BaselineStrategy {
    fallback: FallbackPolicy,
}

impl BaselineStrategy {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }
}

#[async_trait]
impl ClassificationStrategy for BaselineStrategy {
    fn name(&self) -> &str {
        "baseline"
    }

    async fn decide(&self, article: &Article) -> Result<Decision, SwitchyardError> {
        self.fallback.decide(article).await
    }
}

/// Asks the similarity router first and falls back only when it abstains.
///
/// An unreachable backend mid-run aborts the batch.
pub struct HybridStrategy {
    router: Arc<SimilarityRouter>,
    fallback: FallbackPolicy,
}

impl HybridStrategy {
    pub fn new(router: Arc<SimilarityRouter>, fallback: FallbackPolicy) -> Self {
        Self { router, fallback }
    }
}

#[async_trait]
impl ClassificationStrategy for HybridStrategy {
    fn name(&self) -> &str {
        "optimized"
    }

    async fn decide(&self, article: &Article) -> Result<Decision, SwitchyardError> {
        match self.router.route(&article.text).await? {
            Some(matched) => {
                debug!(article = %article.id, route = %matched.name, distance = matched.distance, "router hit");
                Ok(Decision::routed(&matched.name))
            }
            None => self.fallback.decide(article).await,
        }
    }
}
