// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes and their two-phase lifecycle.
//!
//! [`build_routes`] produces a mutable [`RouteSet`]. Calibration consumes it
//! into a [`CalibratedRouteSet`], which has no mutators and is shared with
//! the router behind an `Arc`.

use std::collections::HashSet;

use serde::Serialize;
use switchyard_core::{normalize_label, RouteDefinition, SwitchyardError};
use tracing::info;

/// Lowest valid cosine-distance threshold.
pub const MIN_THRESHOLD: f32 = 0.0;

/// Highest valid cosine-distance threshold.
pub const MAX_THRESHOLD: f32 = 2.0;

/// A category, its reference texts, and its acceptance threshold.
///
/// A query is accepted by the route when its distance is `<= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    name: String,
    references: Vec<String>,
    threshold: f32,
}

impl Route {
    /// Creates a route; fails on empty references or an out-of-range threshold.
    pub fn new(
        name: impl Into<String>,
        references: Vec<String>,
        threshold: f32,
    ) -> Result<Self, SwitchyardError> {
        let name = normalize_label(&name.into());
        if references.is_empty() {
            return Err(SwitchyardError::EmptyReferences { category: name });
        }
        check_threshold(&name, threshold)?;
        Ok(Self {
            name,
            references,
            threshold,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether `distance` satisfies this route's threshold.
    pub fn accepts(&self, distance: f32) -> bool {
        distance <= self.threshold
    }

    pub fn definition(&self) -> RouteDefinition {
        RouteDefinition {
            name: self.name.clone(),
            references: self.references.clone(),
        }
    }
}

fn check_threshold(route: &str, threshold: f32) -> Result<(), SwitchyardError> {
    if (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
        Ok(())
    } else {
        Err(SwitchyardError::InvalidThreshold {
            route: route.to_string(),
            threshold,
        })
    }
}

/// Routes under construction; thresholds may still change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSet {
    routes: Vec<Route>,
}

impl RouteSet {
    /// Creates a set, rejecting duplicate route names.
    pub fn new(routes: Vec<Route>) -> Result<Self, SwitchyardError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.name.as_str()) {
                return Err(SwitchyardError::Config(format!(
                    "duplicate route `{}`",
                    route.name
                )));
            }
        }
        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route definitions for backend registration, in set order.
    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.routes.iter().map(Route::definition).collect()
    }

    /// Replaces one route's threshold.
    pub fn set_threshold(&mut self, name: &str, threshold: f32) -> Result<(), SwitchyardError> {
        check_threshold(name, threshold)?;
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| SwitchyardError::Config(format!("unknown route `{name}`")))?;
        route.threshold = threshold;
        Ok(())
    }

    pub(crate) fn freeze(self, calibrated: bool) -> CalibratedRouteSet {
        CalibratedRouteSet {
            routes: self.routes,
            calibrated,
        }
    }
}

/// Builds one route per category carrying all of its reference texts.
///
/// Any category with zero references fails the whole build; no partial set
/// is returned.
pub fn build_routes<I, S>(references: I, default_threshold: f32) -> Result<RouteSet, SwitchyardError>
where
    I: IntoIterator<Item = (S, Vec<String>)>,
    S: Into<String>,
{
    let routes = references
        .into_iter()
        .map(|(name, refs)| Route::new(name, refs, default_threshold))
        .collect::<Result<Vec<_>, _>>()?;
    let set = RouteSet::new(routes)?;
    info!(routes = set.len(), default_threshold, "built routes");
    Ok(set)
}

/// Frozen routes handed to the router.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedRouteSet {
    routes: Vec<Route>,
    calibrated: bool,
}

impl CalibratedRouteSet {
    /// Freezes a set without calibration, keeping its current thresholds.
    ///
    /// Callers opt into this explicitly when calibration data is unusable.
    pub fn uncalibrated(set: RouteSet) -> Self {
        set.freeze(false)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Whether thresholds came from the optimizer.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.routes.iter().map(Route::definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("reference {i}")).collect()
    }

    #[test]
    fn builds_one_route_per_category() {
        let set = build_routes(
            vec![("politics", refs(3)), ("sport", refs(2))],
            0.5,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.routes()[0].name(), "politics");
        assert_eq!(set.get("sport").unwrap().references().len(), 2);
        assert!(set.routes().iter().all(|r| r.threshold() == 0.5));
    }

    #[test]
    fn route_names_are_normalized() {
        let set = build_routes(vec![(" Tech ", refs(1))], 0.5).unwrap();
        assert!(set.get("tech").is_some());
    }

    #[test]
    fn empty_references_fail_the_whole_build() {
        let err = build_routes(vec![("politics", refs(2)), ("sport", Vec::new())], 0.5)
            .unwrap_err();
        match err {
            SwitchyardError::EmptyReferences { category } => assert_eq!(category, "sport"),
            other => panic!("expected EmptyReferences, got {other}"),
        }
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        assert!(matches!(
            build_routes(vec![("tech", refs(1))], 2.5),
            Err(SwitchyardError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            build_routes(vec![("tech", refs(1))], f32::NAN),
            Err(SwitchyardError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(build_routes(vec![("tech", refs(1)), ("TECH", refs(1))], 0.5).is_err());
    }

    #[test]
    fn accepts_is_inclusive() {
        let route = Route::new("sport", refs(1), 0.4).unwrap();
        assert!(route.accepts(0.4));
        assert!(route.accepts(0.0));
        assert!(!route.accepts(0.41));
    }

    #[test]
    fn set_threshold_validates() {
        let mut set = build_routes(vec![("tech", refs(1))], 0.5).unwrap();
        set.set_threshold("tech", 0.3).unwrap();
        assert_eq!(set.get("tech").unwrap().threshold(), 0.3);
        assert!(set.set_threshold("tech", -0.1).is_err());
        assert!(set.set_threshold("sport", 0.3).is_err());
    }

    #[test]
    fn uncalibrated_freeze_keeps_thresholds() {
        let set = build_routes(vec![("tech", refs(1))], 0.7).unwrap();
        let frozen = CalibratedRouteSet::uncalibrated(set);
        assert!(!frozen.is_calibrated());
        assert_eq!(frozen.get("tech").unwrap().threshold(), 0.7);
        assert_eq!(frozen.definitions()[0].references, refs(1));
    }
}
