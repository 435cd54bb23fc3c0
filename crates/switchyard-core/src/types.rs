// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Switchyard pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Embedding,
    Similarity,
    Fallback,
}

/// One labeled (or unlabeled) text item.
///
/// `category` is empty for unlabeled test data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub category: String,
}

impl Article {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
        }
    }

    /// Whether the article carries a ground-truth category.
    pub fn is_labeled(&self) -> bool {
        !self.category.trim().is_empty()
    }
}

/// Canonical label form: trimmed and lower-cased.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Token usage reported by a generative backend call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A route as registered with a similarity backend: a name and its references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub name: String,
    pub references: Vec<String>,
}

/// Aggregated cosine distance between a query and one route's references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDistance {
    pub name: String,
    pub distance: f32,
}

/// Canonical fallback response, independent of the backend's wire shape.
///
/// `predicted_label` is `None` when the backend answered with something
/// that could not be parsed into the label schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackResponse {
    pub predicted_label: Option<String>,
    pub usage: TokenUsage,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
