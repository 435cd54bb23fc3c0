// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: fraction ranges,
//! the distance range of thresholds, a usable category set, and
//! non-negative prices.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{EndpointConfig, SwitchyardConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &SwitchyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_dataset(config, &mut errors);
    validate_calibration(config, &mut errors);
    validate_similarity(config, &mut errors);
    validate_fallback(config, &mut errors);

    if config.cost.input_per_mtok < 0.0 {
        errors.push(ConfigError::validation(format!(
            "cost.input_per_mtok must be non-negative, got {}",
            config.cost.input_per_mtok
        )));
    }
    if config.cost.output_per_mtok < 0.0 {
        errors.push(ConfigError::validation(format!(
            "cost.output_per_mtok must be non-negative, got {}",
            config.cost.output_per_mtok
        )));
    }

    if config.run.concurrency == 0 {
        errors.push(ConfigError::validation("run.concurrency must be at least 1"));
    }
    if config.run.item_timeout_secs == Some(0) {
        errors.push(ConfigError::validation(
            "run.item_timeout_secs must be positive when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dataset(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let dataset = &config.dataset;

    if dataset.categories.is_empty() {
        errors.push(ConfigError::validation(
            "dataset.categories must name at least one category",
        ));
    }

    let mut seen = HashSet::new();
    for (i, category) in dataset.categories.iter().enumerate() {
        let normalized = category.trim().to_lowercase();
        if normalized.is_empty() {
            errors.push(ConfigError::validation(format!(
                "dataset.categories[{i}] must not be empty"
            )));
            continue;
        }
        if normalized == "unknown" {
            errors.push(ConfigError::validation(
                "dataset.categories must not contain `unknown`; it is reserved for the fallback",
            ));
        }
        if !seen.insert(normalized) {
            errors.push(ConfigError::validation(format!(
                "duplicate category `{category}` in dataset.categories"
            )));
        }
    }

    if dataset.train_limit == 0 {
        errors.push(ConfigError::validation("dataset.train_limit must be at least 1"));
    }
}

fn validate_calibration(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let cal = &config.calibration;

    for (name, value) in [("ref_frac", cal.ref_frac), ("val_frac", cal.val_frac)] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::validation(format!(
                "calibration.{name} must be within [0, 1], got {value}"
            )));
        }
    }
    if cal.ref_frac + cal.val_frac > 1.0 {
        errors.push(ConfigError::validation(format!(
            "calibration.ref_frac + calibration.val_frac must not exceed 1, got {}",
            cal.ref_frac + cal.val_frac
        )));
    }
    if cal.ref_frac <= 0.0 {
        errors.push(ConfigError::validation(
            "calibration.ref_frac must be positive; routes need references",
        ));
    }
    if !(0.0..=2.0).contains(&cal.default_threshold) {
        errors.push(ConfigError::validation(format!(
            "calibration.default_threshold must be a cosine distance within [0, 2], got {}",
            cal.default_threshold
        )));
    }
    if cal.sweep_steps == 0 {
        errors.push(ConfigError::validation("calibration.sweep_steps must be at least 1"));
    }
}

fn validate_similarity(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let sim = &config.similarity;

    validate_endpoint("similarity", &sim.endpoint(), errors);
    if let Some(endpoint) = &sim.fallback_endpoint {
        validate_endpoint("similarity.fallback_endpoint", endpoint, errors);
    }
    if sim.router_name.trim().is_empty() {
        errors.push(ConfigError::validation("similarity.router_name must not be empty"));
    }
    if sim.embedding_dim == 0 {
        errors.push(ConfigError::validation(
            "similarity.embedding_dim must be at least 1",
        ));
    }
}

fn validate_endpoint(prefix: &str, endpoint: &EndpointConfig, errors: &mut Vec<ConfigError>) {
    let host = endpoint.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation(format!("{prefix}.host must not be empty")));
    } else if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        errors.push(ConfigError::validation(format!(
            "{prefix}.host `{host}` is not a valid IP address or hostname"
        )));
    }
    if endpoint.port == 0 {
        errors.push(ConfigError::validation(format!("{prefix}.port must not be 0")));
    }
}

fn validate_fallback(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let fb = &config.fallback;

    if fb.base_url.trim().is_empty() {
        errors.push(ConfigError::validation("fallback.base_url must not be empty"));
    }
    if fb.model.trim().is_empty() {
        errors.push(ConfigError::validation("fallback.model must not be empty"));
    }
    if fb.max_tokens == 0 {
        errors.push(ConfigError::validation("fallback.max_tokens must be at least 1"));
    }
    if !(0.0..=2.0).contains(&fb.temperature) {
        errors.push(ConfigError::validation(format!(
            "fallback.temperature must be within [0, 2], got {}",
            fb.temperature
        )));
    }
    if fb.timeout_secs == 0 {
        errors.push(ConfigError::validation("fallback.timeout_secs must be positive"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&SwitchyardConfig::default()).is_ok());
    }

    #[test]
    fn fractions_exceeding_one_are_rejected() {
        let mut config = SwitchyardConfig::default();
        config.calibration.ref_frac = 0.8;
        config.calibration.val_frac = 0.4;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("must not exceed 1")));
    }

    #[test]
    fn threshold_outside_distance_range_is_rejected() {
        let mut config = SwitchyardConfig::default();
        config.calibration.default_threshold = 2.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("default_threshold")));
    }

    #[test]
    fn duplicate_categories_are_rejected_case_insensitively() {
        let mut config = SwitchyardConfig::default();
        config.dataset.categories = vec!["tech".into(), "Tech ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("duplicate category")));
    }

    #[test]
    fn reserved_unknown_category_is_rejected() {
        let mut config = SwitchyardConfig::default();
        config.dataset.categories.push("unknown".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = SwitchyardConfig::default();
        config.cost.input_per_mtok = -1.0;
        config.run.concurrency = 0;
        config.similarity.port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }

    #[test]
    fn fallback_endpoint_is_validated() {
        let mut config = SwitchyardConfig::default();
        config.similarity.fallback_endpoint = Some(EndpointConfig {
            host: "bad host!".into(),
            port: 6380,
            password: None,
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("similarity.fallback_endpoint.host")));
    }
}
