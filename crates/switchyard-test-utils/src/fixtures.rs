// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Five-category reference corpus for routing tests.
//!
//! Each category draws from its own vocabulary, so a bag-of-words embedder
//! separates them cleanly.

use switchyard_core::Article;

/// The benchmark category set.
pub const CATEGORIES: [&str; 5] = ["politics", "sport", "tech", "business", "entertainment"];

const VOCAB: [(&str, [&str; 6]); 5] = [
    ("politics", ["minister", "parliament", "election", "ballot", "senate", "policy"]),
    ("sport", ["striker", "league", "goalkeeper", "tournament", "coach", "stadium"]),
    ("tech", ["processor", "software", "broadband", "smartphone", "algorithm", "server"]),
    ("business", ["shares", "profits", "merger", "investors", "quarterly", "dividend"]),
    ("entertainment", ["actress", "premiere", "album", "box", "festival", "soundtrack"]),
];

/// Text that shares no token with any reference.
pub const OUT_OF_DISTRIBUTION: &str = "zebra quokka nebula lighthouse violin glacier";

/// Ten reference texts per category, in [`CATEGORIES`] order.
pub fn reference_corpus() -> Vec<(String, Vec<String>)> {
    VOCAB
        .iter()
        .map(|(name, words)| {
            let refs = (0..10)
                .map(|i| {
                    let a = words[i % words.len()];
                    let b = words[(i + 1) % words.len()];
                    let c = words[(i + 3) % words.len()];
                    format!("{a} {b} {c} report {name}{i}")
                })
                .collect();
            (name.to_string(), refs)
        })
        .collect()
}

/// Labeled articles built from the reference corpus.
pub fn labeled_articles() -> Vec<Article> {
    reference_corpus()
        .into_iter()
        .flat_map(|(name, refs)| {
            refs.into_iter()
                .enumerate()
                .map(move |(i, text)| Article::new(format!("{name}-{i}"), text, name.clone()))
        })
        .collect()
}

/// The first reference text of `category`.
pub fn reference_text(category: &str) -> Option<String> {
    reference_corpus()
        .into_iter()
        .find(|(name, _)| name == category)
        .and_then(|(_, refs)| refs.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_has_ten_references_per_category() {
        let corpus = reference_corpus();
        assert_eq!(corpus.len(), CATEGORIES.len());
        for ((name, refs), expected) in corpus.iter().zip(CATEGORIES) {
            assert_eq!(name, expected);
            assert_eq!(refs.len(), 10);
        }
    }

    #[test]
    fn labeled_articles_cover_every_category() {
        let articles = labeled_articles();
        assert_eq!(articles.len(), 50);
        assert!(articles.iter().all(|a| a.is_labeled()));
    }

    #[test]
    fn reference_text_lookup() {
        assert!(reference_text("politics").unwrap().contains("minister"));
        assert!(reference_text("weather").is_none());
    }
}
