// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-time routing against a calibrated route set.

use std::sync::Arc;

use serde::Serialize;
use switchyard_core::{RouteDistance, SimilarityBackend, SwitchyardError};
use tracing::debug;

use crate::route::{CalibratedRouteSet, Route};

/// A confident router decision for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    /// Matched category.
    pub name: String,
    /// Cosine distance to the matched route.
    pub distance: f32,
}

/// Picks the closest route among `distances` that names a route in `routes`.
///
/// Ties keep the earlier route in set order. NaN distances never win.
pub fn nearest_route<'a>(
    routes: &'a [Route],
    distances: &[RouteDistance],
) -> Option<(&'a Route, f32)> {
    let mut best: Option<(&Route, f32)> = None;
    for route in routes {
        let Some(d) = distances.iter().find(|d| d.name == route.name()) else {
            continue;
        };
        if d.distance.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, current)| d.distance < current) {
            best = Some((route, d.distance));
        }
    }
    best
}

/// Scores queries against every route and accepts the nearest one only when
/// it satisfies that route's own threshold.
pub struct SimilarityRouter {
    backend: Arc<dyn SimilarityBackend>,
    routes: Arc<CalibratedRouteSet>,
}

impl SimilarityRouter {
    /// Creates a router over a backend that already holds `routes`.
    pub fn new(backend: Arc<dyn SimilarityBackend>, routes: Arc<CalibratedRouteSet>) -> Self {
        Self { backend, routes }
    }

    pub fn routes(&self) -> &CalibratedRouteSet {
        &self.routes
    }

    pub fn backend(&self) -> &Arc<dyn SimilarityBackend> {
        &self.backend
    }

    /// Routes one query.
    ///
    /// `Ok(None)` is an abstain. An unreachable backend is an error, never
    /// an abstain.
    pub async fn route(&self, text: &str) -> Result<Option<RouteMatch>, SwitchyardError> {
        let distances = self.backend.distances(text).await?;
        let Some((route, distance)) = nearest_route(self.routes.routes(), &distances) else {
            debug!("no route scored the query");
            return Ok(None);
        };

        if route.accepts(distance) {
            debug!(route = route.name(), distance, threshold = route.threshold(), "route matched");
            Ok(Some(RouteMatch {
                name: route.name().to_string(),
                distance,
            }))
        } else {
            debug!(
                nearest = route.name(),
                distance,
                threshold = route.threshold(),
                "router abstained"
            );
            Ok(None)
        }
    }
}
