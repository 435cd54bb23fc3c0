// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calibration behavior across the build → calibrate → route lifecycle.

use std::sync::Arc;

use proptest::prelude::*;
use switchyard_core::SimilarityBackend;
use switchyard_router::{
    build_routes, CalibrationPair, ScoredPair, SimilarityRouter, ThresholdOptimizer,
};
use switchyard_test_utils::{distance, MockBackend};

fn two_routes(threshold: f32) -> switchyard_router::RouteSet {
    build_routes(
        vec![
            ("politics", vec!["minister parliament".to_string()]),
            ("sport", vec!["striker league".to_string()]),
        ],
        threshold,
    )
    .unwrap()
}

/// 20 validation pairs, 10 per category, both routes starting at 0.5.
async fn two_category_validation() -> (MockBackend, Vec<CalibrationPair>) {
    let backend = MockBackend::new();
    let mut pairs = Vec::new();

    // Politics: eight clean matches, two sport articles that drift close.
    for i in 0..8 {
        let q = format!("politics {i}");
        backend
            .respond_to(&q, vec![distance("politics", 0.20 + 0.03 * i as f32), distance("sport", 0.9)])
            .await;
        pairs.push(CalibrationPair::new(q, "politics"));
    }
    for i in 0..2 {
        let q = format!("politics stray {i}");
        backend
            .respond_to(&q, vec![distance("politics", 0.95), distance("sport", 0.9)])
            .await;
        pairs.push(CalibrationPair::new(q, "politics"));
    }

    // Sport: matches spread further out than the default threshold.
    for i in 0..8 {
        let q = format!("sport {i}");
        backend
            .respond_to(&q, vec![distance("politics", 0.97), distance("sport", 0.50 + 0.04 * i as f32)])
            .await;
        pairs.push(CalibrationPair::new(q, "sport"));
    }
    for i in 0..2 {
        let q = format!("sport confusable {i}");
        backend
            .respond_to(&q, vec![distance("politics", 0.60), distance("sport", 0.8)])
            .await;
        pairs.push(CalibrationPair::new(q, "sport"));
    }

    (backend, pairs)
}

#[tokio::test]
async fn thresholds_diverge_and_accuracy_never_drops() {
    let (backend, pairs) = two_category_validation().await;
    assert_eq!(pairs.len(), 20);

    let (routes, report) = ThresholdOptimizer::default()
        .calibrate(two_routes(0.5), &backend, &pairs)
        .await
        .unwrap();

    let politics = routes.get("politics").unwrap().threshold();
    let sport = routes.get("sport").unwrap().threshold();
    assert!((politics - sport).abs() > 0.1, "politics {politics}, sport {sport}");
    assert!(politics < 0.6, "must reject the confusable sport pairs, got {politics}");
    assert!(sport > 0.75, "must accept every clean sport pair, got {sport}");

    assert!(report.accuracy_after() >= report.accuracy_before());
    for route in &report.routes {
        assert!(route.correct_after >= route.correct_before, "{route:?}");
    }
    assert_eq!(report.total_pairs, 20);
}

#[tokio::test]
async fn calibrated_set_routes_validation_queries() {
    let (backend, pairs) = two_category_validation().await;
    let backend = Arc::new(backend);
    let (routes, _) = ThresholdOptimizer::default()
        .calibrate(two_routes(0.5), backend.as_ref(), &pairs)
        .await
        .unwrap();

    let router = SimilarityRouter::new(backend.clone(), Arc::new(routes));
    assert_eq!(router.route("sport 7").await.unwrap().unwrap().name, "sport");
    assert!(router.route("sport confusable 0").await.unwrap().is_none());
    assert!(router.route("unscripted").await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_backend_aborts_calibration() {
    let backend = MockBackend::unavailable("localhost:6379");
    let err = ThresholdOptimizer::default()
        .calibrate(two_routes(0.5), &backend, &[CalibrationPair::new("q", "sport")])
        .await
        .unwrap_err();
    assert!(err.is_router_unavailable());
}

#[tokio::test]
async fn pairs_that_reach_no_route_are_a_calibration_error() {
    let backend = MockBackend::new();
    backend.register(&two_routes(0.5).definitions()).await.unwrap();
    let err = ThresholdOptimizer::default()
        .calibrate(two_routes(0.5), &backend, &[CalibrationPair::new("q", "sport")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("calibration"));
}

fn arb_scored() -> impl Strategy<Value = ScoredPair> {
    let names = prop::sample::select(vec!["politics", "sport"]);
    (names.clone(), names, 0.0f32..=2.0).prop_map(|(expected, nearest, distance)| ScoredPair {
        expected: expected.to_string(),
        nearest: nearest.to_string(),
        distance,
    })
}

proptest! {
    #[test]
    fn calibration_is_monotonic(
        pairs in prop::collection::vec(arb_scored(), 1..40),
        start in 0.0f32..=2.0,
        sweep in any::<bool>(),
    ) {
        let optimizer = if sweep {
            ThresholdOptimizer::new(switchyard_config::model::SearchStrategy::Sweep, 50)
        } else {
            ThresholdOptimizer::default()
        };
        let (routes, report) = optimizer.calibrate_scored(two_routes(start), &pairs).unwrap();

        for route in &report.routes {
            prop_assert!(route.correct_after >= route.correct_before);
        }
        prop_assert!(report.accuracy_after() >= report.accuracy_before());
        for route in routes.routes() {
            prop_assert!((0.0..=2.0).contains(&route.threshold()));
        }
    }
}
