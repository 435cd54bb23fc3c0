// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Switchyard configuration system.

use switchyard_config::diagnostic::ConfigError;
use switchyard_config::model::{Aggregation, BackendKind, SearchStrategy, SwitchyardConfig};
use switchyard_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_switchyard_config() {
    let toml = r#"
[log]
level = "debug"

[dataset]
train_path = "/data/train.csv"
test_path = "/data/test.csv"
train_limit = 500
test_limit = 100
categories = ["politics", "sport"]

[calibration]
ref_frac = 0.5
val_frac = 0.3
seed = 7
default_threshold = 0.4
search = "sweep"
sweep_steps = 50
allow_uncalibrated = true

[similarity]
backend = "remote"
host = "vectors.internal"
port = 6380
password = "hunter2"
aggregation = "min"

[similarity.fallback_endpoint]
host = "localhost"
port = 6379

[fallback]
base_url = "http://localhost:8080/v1"
api_key = "hf_test"
model = "test-model"
provider = "local"

[cost]
input_per_mtok = 1.0
output_per_mtok = 2.0

[run]
concurrency = 4
item_timeout_secs = 5
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.dataset.train_limit, 500);
    assert_eq!(config.dataset.test_limit, Some(100));
    assert_eq!(config.dataset.categories, vec!["politics", "sport"]);
    assert_eq!(config.calibration.seed, 7);
    assert_eq!(config.calibration.search, SearchStrategy::Sweep);
    assert!(config.calibration.allow_uncalibrated);
    assert_eq!(config.similarity.backend, BackendKind::Remote);
    assert_eq!(config.similarity.aggregation, Aggregation::Min);
    assert_eq!(config.similarity.endpoint().address(), "vectors.internal:6380");
    let alt = config.similarity.fallback_endpoint.expect("fallback endpoint");
    assert_eq!(alt.base_url(), "http://localhost:6379");
    assert!(alt.password.is_none());
    assert_eq!(config.fallback.api_key.as_deref(), Some("hf_test"));
    assert_eq!(config.fallback.provider.as_deref(), Some("local"));
    assert!((config.cost.output_per_mtok - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.run.concurrency, 4);
    assert_eq!(config.run.item_timeout_secs, Some(5));
}

/// Missing sections fall back to the benchmark defaults.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.log.level, "info");
    assert_eq!(config.dataset.train_limit, 1000);
    assert_eq!(config.dataset.categories.len(), 5);
    assert!((config.calibration.ref_frac - 0.6).abs() < f64::EPSILON);
    assert!((config.calibration.val_frac - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.calibration.seed, 42);
    assert!((config.calibration.default_threshold - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.calibration.search, SearchStrategy::Observed);
    assert!(!config.calibration.allow_uncalibrated);
    assert_eq!(config.similarity.backend, BackendKind::Local);
    assert_eq!(config.similarity.endpoint().address(), "localhost:6379");
    assert!(config.similarity.fallback_endpoint.is_none());
    assert_eq!(config.fallback.model, "meta-llama/Llama-3.1-8B-Instruct");
    assert_eq!(config.fallback.max_tokens, 16);
    assert!((config.cost.input_per_mtok - 0.09).abs() < f64::EPSILON);
    assert!((config.cost.output_per_mtok - 0.29).abs() < f64::EPSILON);
    assert_eq!(config.run.concurrency, 1);
    assert!(config.run.item_timeout_secs.is_none());
}

/// Unknown field in a section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_calibration_produces_error() {
    let toml = r#"
[calibration]
sede = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("sede"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown section should be rejected");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "telemetry")),
        "got: {errors:?}"
    );
}

/// Wrong value types produce an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[run]
concurrency = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string concurrency");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Unknown enum variants are rejected.
#[test]
fn unknown_backend_kind_is_rejected() {
    let toml = r#"
[similarity]
backend = "faiss"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[calibration]
ref_frac = 0.9
val_frac = 0.5
"#;

    let errors = load_and_validate_str(toml).expect_err("fractions exceed 1");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Dotted overrides (as produced by the env provider) reach nested fields.
#[test]
fn dotted_override_reaches_nested_endpoint() {
    use figment::{providers::Serialized, Figment};

    let config: SwitchyardConfig = Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(("similarity.fallback_endpoint.host", "replica"))
        .merge(("similarity.fallback_endpoint.port", 6390))
        .merge(("fallback.api_key", "from-env"))
        .extract()
        .expect("should merge dotted overrides");

    let alt = config.similarity.fallback_endpoint.expect("endpoint set");
    assert_eq!(alt.address(), "replica:6390");
    assert_eq!(config.fallback.api_key.as_deref(), Some("from-env"));
}

/// An explicit config path is read and validated.
#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("switchyard.toml");
    std::fs::write(&path, "[log]\nlevel = \"warn\"\n").expect("write config");

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.log.level, "warn");
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_file_is_skipped() {
    let config = load_and_validate_path(std::path::Path::new("/nonexistent/switchyard.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.calibration.seed, 42);
}

/// Defaults serialize with lowercase enum tags.
#[test]
fn defaults_serialize() {
    let json = serde_json::to_string(&SwitchyardConfig::default()).expect("serialize");
    assert!(json.contains("\"search\":\"observed\""));
    assert!(json.contains("\"backend\":\"local\""));
}

/// Serialized defaults load back to the same configuration.
#[test]
fn defaults_survive_toml_round_trip() {
    let defaults = SwitchyardConfig::default();
    let text = toml::to_string(&defaults).expect("serialize to TOML");
    let config = load_and_validate_str(&text).expect("serialized defaults should load");

    assert_eq!(config.dataset.categories, defaults.dataset.categories);
    assert_eq!(config.calibration.search, defaults.calibration.search);
    assert_eq!(config.similarity.aggregation, defaults.similarity.aggregation);
    assert_eq!(config.fallback.provider, defaults.fallback.provider);
    assert_eq!(config.fallback.temperature, defaults.fallback.temperature);
    assert_eq!(config.run.item_timeout_secs, None);
}
