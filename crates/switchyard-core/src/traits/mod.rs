// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the pluggable collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod fallback;
pub mod similarity;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use fallback::FallbackClassifier;
pub use similarity::SimilarityBackend;
