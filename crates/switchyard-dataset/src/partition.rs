// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic per-category reference / validation / held-out split.
//!
//! Each category is shuffled independently with an RNG re-seeded from the
//! same seed, then cut at `floor(n * ref_frac)` and
//! `floor(n * ref_frac) + floor(n * val_frac)`. The held-out fraction is
//! whatever remains.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use switchyard_core::{Article, SwitchyardError};
use tracing::debug;

use crate::loader::CategoryGroups;

/// Split result for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPartition {
    pub reference: Vec<Article>,
    pub validation: Vec<Article>,
    pub held_out: Vec<Article>,
}

impl CategoryPartition {
    /// Total number of items across the three slices.
    pub fn len(&self) -> usize {
        self.reference.len() + self.validation.len() + self.held_out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split result for every category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub categories: BTreeMap<String, CategoryPartition>,
}

impl Partition {
    /// Reference texts per category, in shuffled order.
    pub fn reference_texts(&self) -> BTreeMap<String, Vec<String>> {
        self.categories
            .iter()
            .map(|(name, split)| {
                let texts = split.reference.iter().map(|a| a.text.clone()).collect();
                (name.clone(), texts)
            })
            .collect()
    }

    /// Validation articles paired with the category they were drawn from.
    pub fn validation(&self) -> impl Iterator<Item = (&str, &Article)> {
        self.categories
            .iter()
            .flat_map(|(name, split)| split.validation.iter().map(move |a| (name.as_str(), a)))
    }

    /// Held-out articles across all categories.
    pub fn held_out(&self) -> impl Iterator<Item = &Article> {
        self.categories.values().flat_map(|split| split.held_out.iter())
    }
}

/// Partitions grouped articles into reference, validation and held-out slices.
///
/// Fails if either fraction lies outside `[0, 1]` or they sum above 1.
/// Small categories may produce empty slices; that is not an error.
pub fn partition(
    groups: &CategoryGroups,
    ref_frac: f64,
    val_frac: f64,
    seed: u64,
) -> Result<Partition, SwitchyardError> {
    for (name, value) in [("ref_frac", ref_frac), ("val_frac", val_frac)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SwitchyardError::Partition(format!(
                "{name} must be within [0, 1], got {value}"
            )));
        }
    }
    if ref_frac + val_frac > 1.0 {
        return Err(SwitchyardError::Partition(format!(
            "ref_frac + val_frac must not exceed 1, got {}",
            ref_frac + val_frac
        )));
    }

    let categories = groups
        .iter()
        .map(|(name, items)| {
            let split = split_category(items, ref_frac, val_frac, seed);
            debug!(
                category = %name,
                reference = split.reference.len(),
                validation = split.validation.len(),
                held_out = split.held_out.len(),
                "partitioned category"
            );
            (name.clone(), split)
        })
        .collect();

    Ok(Partition { categories })
}

fn split_category(items: &[Article], ref_frac: f64, val_frac: f64, seed: u64) -> CategoryPartition {
    let mut shuffled = items.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n = shuffled.len();
    let a = ((n as f64 * ref_frac).floor() as usize).min(n);
    let b = (a + (n as f64 * val_frac).floor() as usize).min(n);

    let held_out = shuffled.split_off(b);
    let validation = shuffled.split_off(a);
    CategoryPartition {
        reference: shuffled,
        validation,
        held_out,
    }
}
