// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-item records and batch aggregates.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::Display;
use switchyard_core::TokenUsage;

/// Which component produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Router,
    Fallback,
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub article_id: String,
    /// Trimmed, lower-cased prediction; empty when the fallback failed.
    pub predicted_label: String,
    /// Normalized ground truth; empty for unlabeled items.
    pub truth: String,
    pub source: DecisionSource,
    pub elapsed_seconds: f64,
    pub cost: f64,
    pub usage: TokenUsage,
    pub correct: bool,
}

/// Aggregate over one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub responses: Vec<RunRecord>,
    pub total_cost: f64,
    pub mean_latency_seconds: f64,
    pub accuracy: f64,
}

impl RunStats {
    /// Aggregates `records`, preserving their order.
    pub fn from_records(records: Vec<RunRecord>) -> Self {
        let total_cost = records.iter().map(|r| r.cost).sum();
        let mean_latency_seconds = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.elapsed_seconds).sum::<f64>() / records.len() as f64
        };

        let labeled = records.iter().filter(|r| !r.truth.is_empty()).count();
        let correct = records.iter().filter(|r| r.correct).count();
        let accuracy = if labeled == 0 {
            0.0
        } else {
            correct as f64 / labeled as f64
        };

        Self {
            responses: records,
            total_cost,
            mean_latency_seconds,
            accuracy,
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn total_seconds(&self) -> f64 {
        self.responses.iter().map(|r| r.elapsed_seconds).sum()
    }

    pub fn router_hits(&self) -> usize {
        self.count_source(DecisionSource::Router)
    }

    pub fn fallback_calls(&self) -> usize {
        self.count_source(DecisionSource::Fallback)
    }

    fn count_source(&self, source: DecisionSource) -> usize {
        self.responses.iter().filter(|r| r.source == source).count()
    }

    /// One-line summary, e.g.
    /// `baseline   | accuracy=0.900 | cost=$0.000123 | total_seconds=1.234 | average_seconds=0.123`.
    pub fn summary(&self, name: &str) -> String {
        format!(
            "{name:<10} | accuracy={:.3} | cost=${:.6} | total_seconds={:.3} | average_seconds={:.3}",
            self.accuracy,
            self.total_cost,
            self.total_seconds(),
            self.mean_latency_seconds,
        )
    }

    /// Per-label precision, recall, and F1 over the labeled records.
    pub fn report(&self) -> ClassificationReport {
        ClassificationReport::from_records(&self.responses)
    }
}

/// Precision, recall, and F1 for one label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Classification report over labeled records.
///
/// Labels are the union of truths and non-empty predictions, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub labels: BTreeMap<String, LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: LabelMetrics,
    pub support: usize,
}

#[derive(Default)]
struct Counts {
    true_pos: usize,
    predicted: usize,
    actual: usize,
}

impl ClassificationReport {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
        let mut support = 0;
        let mut correct = 0;

        for record in records.iter().filter(|r| !r.truth.is_empty()) {
            support += 1;
            counts.entry(&record.truth).or_default().actual += 1;
            if !record.predicted_label.is_empty() {
                counts.entry(&record.predicted_label).or_default().predicted += 1;
            }
            if record.correct {
                correct += 1;
                counts.entry(&record.truth).or_default().true_pos += 1;
            }
        }

        let labels: BTreeMap<String, LabelMetrics> = counts
            .into_iter()
            .map(|(label, c)| {
                let precision = ratio(c.true_pos, c.predicted);
                let recall = ratio(c.true_pos, c.actual);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                let metrics = LabelMetrics {
                    precision,
                    recall,
                    f1,
                    support: c.actual,
                };
                (label.to_string(), metrics)
            })
            .collect();

        let n = labels.len().max(1) as f64;
        let macro_avg = LabelMetrics {
            precision: labels.values().map(|m| m.precision).sum::<f64>() / n,
            recall: labels.values().map(|m| m.recall).sum::<f64>() / n,
            f1: labels.values().map(|m| m.f1).sum::<f64>() / n,
            support,
        };

        Self {
            labels,
            accuracy: ratio(correct, support),
            macro_avg,
            support,
        }
    }

    /// Plain-text table in the familiar precision/recall/f1/support layout.
    pub fn render(&self) -> String {
        let width = self
            .labels
            .keys()
            .map(String::len)
            .chain(["macro avg".len()])
            .max()
            .unwrap_or(9);
        let mut out = format!(
            "{:>width$} {:>9} {:>9} {:>9} {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for (label, m) in &self.labels {
            out.push_str(&row(label, m, width));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy", "", "", self.accuracy, self.support
        ));
        out.push_str(&row("macro avg", &self.macro_avg, width));
        out
    }
}

fn row(label: &str, m: &LabelMetrics, width: usize) -> String {
    format!(
        "{label:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        m.precision, m.recall, m.f1, m.support
    )
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
