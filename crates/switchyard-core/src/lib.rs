// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Switchyard hybrid classifier.
//!
//! This crate provides the error taxonomy, the shared domain types, and the
//! adapter traits behind which the embedding, similarity, and generative
//! fallback collaborators are plugged in.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SwitchyardError;
pub use types::{
    normalize_label, AdapterType, Article, FallbackResponse, HealthStatus, RouteDefinition,
    RouteDistance, TokenUsage,
};

pub use traits::{EmbeddingAdapter, FallbackClassifier, PluginAdapter, SimilarityBackend};
