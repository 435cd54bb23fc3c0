// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost accounting for the Switchyard hybrid classifier.
//!
//! This crate provides:
//! - **Pricing**: per-million-token input/output rates and cost calculation
//! - **Tally**: in-memory running totals of fallback calls, tokens, and spend

pub mod pricing;
pub mod tally;

pub use pricing::{calculate_cost, ModelPricing};
pub use tally::CostTally;
