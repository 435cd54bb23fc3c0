// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV dataset source.
//!
//! Expects a header row `ArticleId,Text,Category`. The `Category` column
//! may be absent or empty for unlabeled test data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use switchyard_core::{normalize_label, Article, SwitchyardError};
use tracing::{debug, warn};

/// Labeled articles keyed by normalized category name.
pub type CategoryGroups = BTreeMap<String, Vec<Article>>;

#[derive(Debug, Deserialize)]
struct ArticleRow {
    #[serde(rename = "ArticleId")]
    id: String,
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "Category", default)]
    category: String,
}

/// Reads articles from a CSV file, keeping at most `limit` rows.
pub fn load_articles(path: &Path, limit: Option<usize>) -> Result<Vec<Article>, SwitchyardError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| SwitchyardError::Dataset {
        message: format!("failed to open {}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let mut articles = Vec::new();
    for (line, row) in reader.deserialize::<ArticleRow>().enumerate() {
        if limit.is_some_and(|max| articles.len() >= max) {
            break;
        }
        let row = row.map_err(|e| SwitchyardError::Dataset {
            // +2: one for the header, one for 1-based numbering.
            message: format!("malformed row {} in {}", line + 2, path.display()),
            source: Some(Box::new(e)),
        })?;
        articles.push(Article::new(row.id, row.text, row.category.trim()));
    }

    debug!(path = %path.display(), count = articles.len(), "loaded articles");
    Ok(articles)
}

/// Groups labeled articles under the configured categories.
///
/// Every configured category gets an entry, possibly empty. Unlabeled
/// articles and articles labeled outside the category set are dropped.
pub fn group_by_category(articles: &[Article], categories: &[String]) -> CategoryGroups {
    let mut groups: CategoryGroups = categories
        .iter()
        .map(|c| (normalize_label(c), Vec::new()))
        .collect();

    let mut skipped = 0usize;
    for article in articles.iter().filter(|a| a.is_labeled()) {
        match groups.get_mut(&normalize_label(&article.category)) {
            Some(group) => group.push(article.clone()),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "articles labeled outside the configured categories were dropped");
    }
    groups
}
