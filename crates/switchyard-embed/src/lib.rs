// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding and similarity backends for the Switchyard router.
//!
//! This crate provides:
//! - [`HashingEmbedder`]: a dependency-free feature-hashing text embedder
//! - [`LocalBackend`]: an in-process [`SimilarityBackend`] over any embedder
//! - [`RemoteBackend`]: a [`SimilarityBackend`] served over HTTP/JSON
//! - [`connect`]: builds the backend selected by [`SimilarityConfig`]
//!
//! All backends report cosine distance (`1 - cos`, range `[0, 2]`).

pub mod embedder;
pub mod local;
pub mod remote;

use std::sync::Arc;

use switchyard_config::model::{BackendKind, EndpointConfig, SimilarityConfig};
use switchyard_core::{SimilarityBackend, SwitchyardError};

pub use embedder::{cosine_similarity, l2_normalize, HashingEmbedder};
pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Builds the similarity backend selected by `config`, addressed at `endpoint`.
///
/// `endpoint` is ignored by the in-process backend.
pub fn connect(
    config: &SimilarityConfig,
    endpoint: &EndpointConfig,
) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError> {
    match config.backend {
        BackendKind::Local => {
            let embedder = Arc::new(HashingEmbedder::new(config.embedding_dim));
            Ok(Arc::new(LocalBackend::new(embedder, config.aggregation)))
        }
        BackendKind::Remote => Ok(Arc::new(RemoteBackend::new(
            endpoint,
            &config.router_name,
            std::time::Duration::from_secs(config.timeout_secs),
        )?)),
    }
}
