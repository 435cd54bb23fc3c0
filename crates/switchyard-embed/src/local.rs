// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process similarity backend.
//!
//! Holds one embedded reference matrix per route and scores queries by
//! brute-force cosine distance, folded per route by [`Aggregation`].

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_config::model::Aggregation;
use switchyard_core::traits::{EmbeddingAdapter, PluginAdapter, SimilarityBackend};
use switchyard_core::types::EmbeddingInput;
use switchyard_core::{AdapterType, HealthStatus, RouteDefinition, RouteDistance, SwitchyardError};
use tokio::sync::RwLock;
use tracing::debug;

use crate::embedder::cosine_similarity;

/// Distance reported for a route that holds no reference vectors.
const MAX_DISTANCE: f32 = 2.0;

struct IndexedRoute {
    name: String,
    vectors: Vec<Vec<f32>>,
}

/// Similarity backend that embeds and scores everything in-process.
pub struct LocalBackend {
    embedder: Arc<dyn EmbeddingAdapter>,
    aggregation: Aggregation,
    routes: RwLock<Vec<IndexedRoute>>,
}

impl LocalBackend {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, aggregation: Aggregation) -> Self {
        Self {
            embedder,
            aggregation,
            routes: RwLock::new(Vec::new()),
        }
    }

    fn aggregate(&self, query: &[f32], vectors: &[Vec<f32>]) -> f32 {
        if vectors.is_empty() {
            return MAX_DISTANCE;
        }
        let distances = vectors.iter().map(|v| 1.0 - cosine_similarity(query, v));
        match self.aggregation {
            Aggregation::Min => distances.fold(MAX_DISTANCE, f32::min),
            Aggregation::Avg => distances.sum::<f32>() / vectors.len() as f32,
        }
    }
}

#[async_trait]
impl PluginAdapter for LocalBackend {
    fn name(&self) -> &str {
        "local-similarity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Similarity
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        let routes = self.routes.read().await;
        if routes.is_empty() {
            Ok(HealthStatus::Degraded("no routes registered".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl SimilarityBackend for LocalBackend {
    async fn register(&self, routes: &[RouteDefinition]) -> Result<(), SwitchyardError> {
        let mut indexed = Vec::with_capacity(routes.len());
        for route in routes {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: route.references.clone(),
                })
                .await?;
            debug!(
                route = %route.name,
                references = output.embeddings.len(),
                dimensions = output.dimensions,
                "indexed route"
            );
            indexed.push(IndexedRoute {
                name: route.name.clone(),
                vectors: output.embeddings,
            });
        }
        *self.routes.write().await = indexed;
        Ok(())
    }

    async fn distances(&self, text: &str) -> Result<Vec<RouteDistance>, SwitchyardError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        let query = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SwitchyardError::Internal("embedder returned no vector".into()))?;

        let routes = self.routes.read().await;
        Ok(routes
            .iter()
            .map(|route| RouteDistance {
                name: route.name.clone(),
                distance: self.aggregate(&query, &route.vectors),
            })
            .collect())
    }
}
