// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard doctor` command implementation.
//!
//! Runs diagnostic checks against the datasets, the similarity backend, and
//! the fallback endpoint before a long run.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use switchyard_config::model::BackendKind;
use switchyard_config::SwitchyardConfig;
use switchyard_core::traits::PluginAdapter;
use switchyard_core::HealthStatus;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `switchyard doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &SwitchyardConfig, plain: bool) {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_dataset("Training data", &config.dataset.train_path),
        check_dataset("Test data", &config.dataset.test_path),
        check_similarity_backend(config).await,
        check_fallback(config).await,
    ];

    println!();
    println!("  switchyard doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}

/// Check a dataset CSV exists and its header parses.
fn check_dataset(name: &str, path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(path).exists() {
        return CheckResult::new(name, CheckStatus::Fail, format!("not found: {path}"), start);
    }
    match switchyard_dataset::load_articles(Path::new(path), Some(1)) {
        Ok(rows) if rows.is_empty() => CheckResult::new(name, CheckStatus::Warn, "no rows", start),
        Ok(_) => CheckResult::new(name, CheckStatus::Pass, path, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the configured similarity backend answers its health check.
async fn check_similarity_backend(config: &SwitchyardConfig) -> CheckResult {
    let name = "Similarity backend";
    let start = Instant::now();
    let endpoint = config.similarity.endpoint();

    let backend = match switchyard_embed::connect(&config.similarity, &endpoint) {
        Ok(backend) => backend,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    };

    // The in-process backend has no routes yet, which it reports as degraded.
    if config.similarity.backend == BackendKind::Local {
        return CheckResult::new(name, CheckStatus::Pass, "in-process", start);
    }

    match backend.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new(name, CheckStatus::Pass, endpoint.address(), start)
        }
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(name, CheckStatus::Warn, reason, start),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(name, CheckStatus::Fail, reason, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the fallback endpoint accepts the resolved credential.
async fn check_fallback(config: &SwitchyardConfig) -> CheckResult {
    let name = "Fallback API";
    let start = Instant::now();
    let classifier = match crate::commands::fallback_classifier(config) {
        Ok(classifier) => classifier,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    };
    match classifier.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new(name, CheckStatus::Pass, config.fallback.base_url.as_str(), start)
        }
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(name, CheckStatus::Warn, reason, start),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(name, CheckStatus::Fail, reason, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dataset_fails() {
        let result = check_dataset("Training data", "/nonexistent/train.csv");
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("not found"));
    }

    #[test]
    fn readable_dataset_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "ArticleId,Text,Category\n1,shares rallied,business\n").unwrap();
        let result = check_dataset("Training data", path.to_str().unwrap());
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn plain_lines_use_bracket_tags() {
        let result = CheckResult {
            name: "Fallback API".into(),
            status: CheckStatus::Warn,
            message: "no API key configured".into(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.starts_with("    [WARN] Fallback API"));
        assert!(line.ends_with("no API key configured (3ms)"));
    }

    #[tokio::test]
    async fn local_backend_passes_without_network() {
        let result = check_similarity_backend(&SwitchyardConfig::default()).await;
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn fallback_rejecting_credential_warns() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut config = SwitchyardConfig::default();
        config.fallback.base_url = format!("{}/v1", server.uri());
        config.fallback.api_key = Some("hf_revoked".into());
        let result = check_fallback(&config).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("401"), "{}", result.message);
    }

    #[tokio::test]
    async fn fallback_unreachable_fails() {
        let mut config = SwitchyardConfig::default();
        config.fallback.base_url = "http://127.0.0.1:1/v1".into();
        config.fallback.api_key = Some("hf_test".into());
        let result = check_fallback(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }
}
