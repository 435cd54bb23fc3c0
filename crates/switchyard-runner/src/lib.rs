// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run orchestration for the Switchyard hybrid classifier.
//!
//! This crate provides:
//! - [`ClassificationStrategy`] with [`BaselineStrategy`] (always fallback)
//!   and [`HybridStrategy`] (router first, fallback on abstain)
//! - [`BatchRunner`]: the shared per-item loop producing [`RunStats`]
//! - [`prepare_router`]: partition → build → connect → calibrate, with the
//!   failed phase named in [`PipelineError`]

pub mod pipeline;
pub mod runner;
pub mod stats;
pub mod strategy;

pub use pipeline::{
    calibration_pairs, prepare_router, route_references, Phase, PipelineError, PreparedRouter,
};
pub use runner::BatchRunner;
pub use stats::{ClassificationReport, DecisionSource, LabelMetrics, RunRecord, RunStats};
pub use strategy::{BaselineStrategy, ClassificationStrategy, Decision, FallbackPolicy, HybridStrategy};
