// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dataset source and partitioner for the Switchyard hybrid classifier.
//!
//! This crate provides:
//! - [`load_articles`]: CSV loading with an optional row cap
//! - [`group_by_category`]: per-category grouping of labeled articles
//! - [`partition`]: the fixed-seed reference / validation / held-out split

pub mod loader;
pub mod partition;

pub use loader::{group_by_category, load_articles, CategoryGroups};
pub use partition::{partition, CategoryPartition, Partition};
