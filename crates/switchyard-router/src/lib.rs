// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity routing for the Switchyard hybrid classifier.
//!
//! This crate provides:
//! - [`build_routes`]: one [`Route`] per category with a default threshold
//! - [`ThresholdOptimizer`]: per-route threshold calibration against validation pairs
//! - [`SimilarityRouter`]: nearest-route matching with per-route acceptance
//!
//! Thresholds live in a mutable [`RouteSet`] only until calibration turns
//! it into an immutable [`CalibratedRouteSet`]; the router only ever sees
//! the calibrated form.

pub mod optimizer;
pub mod route;
pub mod router;

pub use optimizer::{
    CalibrationPair, CalibrationReport, RouteCalibration, ScoredPair, ThresholdOptimizer,
};
pub use route::{build_routes, CalibratedRouteSet, Route, RouteSet, MAX_THRESHOLD, MIN_THRESHOLD};
pub use router::{nearest_route, RouteMatch, SimilarityRouter};
