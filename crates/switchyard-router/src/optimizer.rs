// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-route threshold calibration.
//!
//! A validation pair only ever depends on the threshold of its nearest
//! route, so each route is optimized on its own slice of pairs:
//!
//! - a pair is decided correctly when the route accepts it and the route is
//!   the expected category (true accept), or rejects it and is not (correct
//!   reject);
//! - the chosen threshold maximizes correctly decided pairs, ties going to
//!   the lowest (strictest) candidate;
//! - the route's starting threshold is always a candidate, so calibration
//!   never lowers validation accuracy.

use std::collections::HashSet;

use serde::Serialize;
use switchyard_config::model::{CalibrationConfig, SearchStrategy};
use switchyard_core::{normalize_label, SimilarityBackend, SwitchyardError};
use tracing::{debug, info};

use crate::route::{CalibratedRouteSet, RouteSet, MAX_THRESHOLD, MIN_THRESHOLD};
use crate::router::nearest_route;

/// One labeled validation sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalibrationPair {
    pub query: String,
    pub expected: String,
}

impl CalibrationPair {
    pub fn new(query: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            expected: normalize_label(&expected.into()),
        }
    }
}

/// A validation pair after scoring: its nearest route and that distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPair {
    pub expected: String,
    pub nearest: String,
    pub distance: f32,
}

/// Calibration outcome for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCalibration {
    pub route: String,
    /// Pairs whose nearest route is this one.
    pub pairs: usize,
    pub threshold_before: f32,
    pub threshold_after: f32,
    pub correct_before: usize,
    pub correct_after: usize,
}

impl RouteCalibration {
    pub fn accuracy_before(&self) -> f64 {
        ratio(self.correct_before, self.pairs)
    }

    pub fn accuracy_after(&self) -> f64 {
        ratio(self.correct_after, self.pairs)
    }
}

/// Calibration outcome for the whole set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub routes: Vec<RouteCalibration>,
    /// Scored pairs that reached some route.
    pub total_pairs: usize,
}

impl CalibrationReport {
    pub fn correct_before(&self) -> usize {
        self.routes.iter().map(|r| r.correct_before).sum()
    }

    pub fn correct_after(&self) -> usize {
        self.routes.iter().map(|r| r.correct_after).sum()
    }

    /// Router decision accuracy over the validation pairs at the starting thresholds.
    pub fn accuracy_before(&self) -> f64 {
        ratio(self.correct_before(), self.total_pairs)
    }

    /// Router decision accuracy over the validation pairs after calibration.
    pub fn accuracy_after(&self) -> f64 {
        ratio(self.correct_after(), self.total_pairs)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Chooses per-route thresholds from labeled validation pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdOptimizer {
    search: SearchStrategy,
    sweep_steps: usize,
}

impl Default for ThresholdOptimizer {
    fn default() -> Self {
        Self::from_config(&CalibrationConfig::default())
    }
}

impl ThresholdOptimizer {
    pub fn new(search: SearchStrategy, sweep_steps: usize) -> Self {
        Self {
            search,
            sweep_steps: sweep_steps.max(1),
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(config.search, config.sweep_steps)
    }

    /// Scores `pairs` through `backend` and calibrates `set`.
    ///
    /// The backend must already hold the routes of `set`.
    pub async fn calibrate(
        &self,
        set: RouteSet,
        backend: &dyn SimilarityBackend,
        pairs: &[CalibrationPair],
    ) -> Result<(CalibratedRouteSet, CalibrationReport), SwitchyardError> {
        check_pairs(&set, pairs)?;

        let mut scored = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let distances = backend.distances(&pair.query).await?;
            if let Some((route, distance)) = nearest_route(set.routes(), &distances) {
                scored.push(ScoredPair {
                    expected: pair.expected.clone(),
                    nearest: route.name().to_string(),
                    distance,
                });
            }
        }
        debug!(pairs = pairs.len(), scored = scored.len(), "scored validation pairs");

        self.calibrate_scored(set, &scored)
    }

    /// Calibrates `set` from already-scored pairs.
    pub fn calibrate_scored(
        &self,
        mut set: RouteSet,
        scored: &[ScoredPair],
    ) -> Result<(CalibratedRouteSet, CalibrationReport), SwitchyardError> {
        if scored.is_empty() {
            return Err(SwitchyardError::Calibration(
                "no validation pair reached any configured route".into(),
            ));
        }

        let mut report = CalibrationReport {
            routes: Vec::with_capacity(set.len()),
            total_pairs: scored.len(),
        };

        let names: Vec<String> = set.routes().iter().map(|r| r.name().to_string()).collect();
        for name in names {
            let before = set.get(&name).map(|r| r.threshold()).unwrap_or(MIN_THRESHOLD);
            let slice: Vec<&ScoredPair> = scored.iter().filter(|p| p.nearest == name).collect();

            let correct_before = count_correct(&name, &slice, before);
            let (after, correct_after) = if slice.is_empty() {
                (before, 0)
            } else {
                self.best_threshold(&name, &slice, before)
            };
            set.set_threshold(&name, after)?;

            info!(
                route = %name,
                pairs = slice.len(),
                threshold_before = before,
                threshold_after = after,
                correct_before,
                correct_after,
                "route calibrated"
            );
            report.routes.push(RouteCalibration {
                route: name,
                pairs: slice.len(),
                threshold_before: before,
                threshold_after: after,
                correct_before,
                correct_after,
            });
        }

        Ok((set.freeze(true), report))
    }

    fn candidates(&self, slice: &[&ScoredPair], start: f32) -> Vec<f32> {
        let mut candidates = vec![start];
        match self.search {
            SearchStrategy::Observed => {
                candidates.push(MIN_THRESHOLD);
                candidates.extend(
                    slice
                        .iter()
                        .map(|p| p.distance)
                        .filter(|d| (MIN_THRESHOLD..=MAX_THRESHOLD).contains(d)),
                );
            }
            SearchStrategy::Sweep => {
                let step = (MAX_THRESHOLD - MIN_THRESHOLD) / self.sweep_steps as f32;
                candidates.extend(
                    (0..=self.sweep_steps).map(|i| (MIN_THRESHOLD + step * i as f32).min(MAX_THRESHOLD)),
                );
            }
        }
        candidates.sort_by(f32::total_cmp);
        candidates.dedup();
        candidates
    }

    fn best_threshold(&self, route: &str, slice: &[&ScoredPair], start: f32) -> (f32, usize) {
        // Ascending candidates with a strict `>` keep the lowest threshold on ties.
        let mut best = (start, count_correct(route, slice, start));
        for candidate in self.candidates(slice, start) {
            let correct = count_correct(route, slice, candidate);
            if correct > best.1 || (correct == best.1 && candidate < best.0) {
                best = (candidate, correct);
            }
        }
        best
    }
}

fn count_correct(route: &str, slice: &[&ScoredPair], threshold: f32) -> usize {
    slice
        .iter()
        .filter(|p| (p.distance <= threshold) == (p.expected == route))
        .count()
}

fn check_pairs(set: &RouteSet, pairs: &[CalibrationPair]) -> Result<(), SwitchyardError> {
    if pairs.is_empty() {
        return Err(SwitchyardError::Calibration("validation set is empty".into()));
    }

    let mut covered = HashSet::new();
    for pair in pairs {
        if set.get(&pair.expected).is_none() {
            return Err(SwitchyardError::Calibration(format!(
                "validation pair names unknown category `{}`",
                pair.expected
            )));
        }
        covered.insert(pair.expected.as_str());
    }
    if covered.is_empty() {
        return Err(SwitchyardError::Calibration(
            "validation set covers no configured category".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::build_routes;

    fn set(names: &[&str], threshold: f32) -> RouteSet {
        build_routes(
            names.iter().map(|n| (*n, vec![format!("{n} reference")])),
            threshold,
        )
        .unwrap()
    }

    fn scored(expected: &str, nearest: &str, distance: f32) -> ScoredPair {
        ScoredPair {
            expected: expected.into(),
            nearest: nearest.into(),
            distance,
        }
    }

    #[test]
    fn tightens_threshold_to_reject_false_accepts() {
        let pairs = vec![
            scored("sport", "sport", 0.1),
            scored("sport", "sport", 0.2),
            scored("tech", "sport", 0.4),
        ];
        let (routes, report) = ThresholdOptimizer::default()
            .calibrate_scored(set(&["sport", "tech"], 0.5), &pairs)
            .unwrap();

        assert!((routes.get("sport").unwrap().threshold() - 0.2).abs() < f32::EPSILON);
        assert_eq!(report.routes[0].correct_before, 2);
        assert_eq!(report.routes[0].correct_after, 3);
    }

    #[test]
    fn loosens_threshold_to_capture_true_accepts() {
        let pairs = vec![
            scored("politics", "politics", 0.55),
            scored("politics", "politics", 0.62),
            scored("sport", "politics", 0.9),
        ];
        let (routes, _) = ThresholdOptimizer::default()
            .calibrate_scored(set(&["politics", "sport"], 0.5), &pairs)
            .unwrap();
        assert!((routes.get("politics").unwrap().threshold() - 0.62).abs() < f32::EPSILON);
    }

    #[test]
    fn ties_prefer_the_strictest_threshold() {
        // Accepting costs one false accept and gains one true accept.
        let pairs = vec![scored("tech", "tech", 0.3), scored("sport", "tech", 0.25)];
        let (routes, _) = ThresholdOptimizer::default()
            .calibrate_scored(set(&["tech", "sport"], 0.5), &pairs)
            .unwrap();
        assert_eq!(routes.get("tech").unwrap().threshold(), 0.0);
    }

    #[test]
    fn routes_without_pairs_keep_their_threshold() {
        let pairs = vec![scored("tech", "tech", 0.3)];
        let (routes, report) = ThresholdOptimizer::default()
            .calibrate_scored(set(&["tech", "sport"], 0.45), &pairs)
            .unwrap();
        assert_eq!(routes.get("sport").unwrap().threshold(), 0.45);
        assert_eq!(report.routes[1].pairs, 0);
        assert!(routes.is_calibrated());
    }

    #[test]
    fn sweep_strategy_lands_on_grid_points() {
        let pairs = vec![scored("tech", "tech", 0.33), scored("sport", "tech", 0.71)];
        let (routes, _) = ThresholdOptimizer::new(SearchStrategy::Sweep, 20)
            .calibrate_scored(set(&["tech", "sport"], 1.5), &pairs)
            .unwrap();
        let t = routes.get("tech").unwrap().threshold();
        assert!((0.33..0.71).contains(&t), "got {t}");
        assert!(((t * 10.0).round() - t * 10.0).abs() < 1e-4, "not on the 0.1 grid: {t}");
    }

    #[test]
    fn empty_scored_pairs_fail() {
        let err = ThresholdOptimizer::default()
            .calibrate_scored(set(&["tech"], 0.5), &[])
            .unwrap_err();
        assert!(matches!(err, SwitchyardError::Calibration(_)));
    }

    #[test]
    fn unknown_category_in_pairs_fails() {
        let err = check_pairs(
            &set(&["tech"], 0.5),
            &[CalibrationPair::new("text", "weather")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("weather"));
    }

    #[test]
    fn empty_pairs_fail() {
        assert!(matches!(
            check_pairs(&set(&["tech"], 0.5), &[]),
            Err(SwitchyardError::Calibration(_))
        ));
    }

    #[test]
    #[tracing_test::traced_test]
    fn calibration_logs_each_route() {
        let pairs = vec![scored("tech", "tech", 0.3)];
        ThresholdOptimizer::default()
            .calibrate_scored(set(&["tech", "sport"], 0.5), &pairs)
            .unwrap();
        assert!(logs_contain("route calibrated"));
        assert!(logs_contain("route=sport"));
    }

    #[test]
    fn pair_labels_are_normalized() {
        assert_eq!(CalibrationPair::new("q", " Sport ").expected, "sport");
    }
}
