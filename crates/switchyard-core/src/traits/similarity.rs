// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity backend trait: the store that holds route references and
//! scores queries against them.

use async_trait::async_trait;

use crate::error::SwitchyardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{RouteDefinition, RouteDistance};

/// Backend that scores a query against every registered route.
///
/// Thresholds are not the backend's concern: it reports one aggregated
/// distance per route and the router decides. An unreachable backend must
/// surface as [`SwitchyardError::RouterUnavailable`].
#[async_trait]
pub trait SimilarityBackend: PluginAdapter {
    /// Registers (or replaces) the route set held by the backend.
    async fn register(&self, routes: &[RouteDefinition]) -> Result<(), SwitchyardError>;

    /// Returns the distance from `text` to each registered route.
    async fn distances(&self, text: &str) -> Result<Vec<RouteDistance>, SwitchyardError>;
}
