// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate properties of `RunStats` over arbitrary record sets.

use proptest::prelude::*;
use switchyard_core::TokenUsage;
use switchyard_runner::{DecisionSource, RunRecord, RunStats};

const LABELS: [&str; 4] = ["politics", "sport", "tech", ""];

fn record() -> impl Strategy<Value = RunRecord> {
    (0usize..4, 0usize..4, any::<bool>(), 0.0f64..2.0, 0u32..5_000, 0u32..50).prop_map(
        |(p, t, routed, elapsed, prompt, completion)| {
            let predicted = LABELS[p].to_string();
            let truth = LABELS[t].to_string();
            let (source, cost) = if routed {
                (DecisionSource::Router, 0.0)
            } else {
                let cost = (prompt as f64 * 0.09 + completion as f64 * 0.29) / 1_000_000.0;
                (DecisionSource::Fallback, cost)
            };
            RunRecord {
                article_id: format!("{p}-{t}"),
                correct: !truth.is_empty() && predicted == truth,
                predicted_label: predicted,
                truth,
                source,
                elapsed_seconds: elapsed,
                cost,
                usage: TokenUsage {
                    prompt_tokens: prompt,
                    completion_tokens: completion,
                },
            }
        },
    )
}

proptest! {
    #[test]
    fn total_cost_is_additive_and_non_negative(records in prop::collection::vec(record(), 0..40)) {
        let expected: f64 = records.iter().map(|r| r.cost).sum();
        let stats = RunStats::from_records(records);
        prop_assert!(stats.total_cost >= 0.0);
        prop_assert!((stats.total_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn accuracy_stays_within_unit_interval(records in prop::collection::vec(record(), 0..40)) {
        let labeled = records.iter().filter(|r| !r.truth.is_empty()).count();
        let stats = RunStats::from_records(records);
        prop_assert!((0.0..=1.0).contains(&stats.accuracy));
        if labeled == 0 {
            prop_assert_eq!(stats.accuracy, 0.0);
        }
    }

    #[test]
    fn records_keep_their_order(records in prop::collection::vec(record(), 0..40)) {
        let ids: Vec<String> = records.iter().map(|r| r.article_id.clone()).collect();
        let stats = RunStats::from_records(records);
        let kept: Vec<String> = stats.responses.iter().map(|r| r.article_id.clone()).collect();
        prop_assert_eq!(kept, ids);
    }
}
