// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard run`, `calibrate`, and `partition`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use switchyard_config::model::EndpointConfig;
use switchyard_config::SwitchyardConfig;
use switchyard_core::{Article, SimilarityBackend, SwitchyardError};
use switchyard_cost::ModelPricing;
use switchyard_dataset::{group_by_category, load_articles, partition as split};
use switchyard_fallback::ChatCompletionClassifier;
use switchyard_runner::{
    prepare_router, BaselineStrategy, BatchRunner, FallbackPolicy, HybridStrategy,
    PipelineError, PreparedRouter, RunStats,
};
use thiserror::Error;
use tracing::info;

/// Environment variable consulted when `fallback.api_key` is unset.
const TOKEN_ENV: &str = "HF_TOKEN";

/// Which strategies `switchyard run` executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    Baseline,
    Hybrid,
    Both,
}

impl StrategyChoice {
    fn baseline(self) -> bool {
        matches!(self, StrategyChoice::Baseline | StrategyChoice::Both)
    }

    fn hybrid(self) -> bool {
        matches!(self, StrategyChoice::Hybrid | StrategyChoice::Both)
    }
}

#[derive(Debug)]
pub struct RunArgs {
    pub strategy: StrategyChoice,
    pub test: Option<PathBuf>,
    pub train: Option<PathBuf>,
    pub limit: Option<usize>,
    pub json: Option<PathBuf>,
}

/// Errors that end a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Switchyard(#[from] SwitchyardError),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classifies the test set with the selected strategies.
pub async fn run(config: &SwitchyardConfig, args: RunArgs) -> Result<(), CommandError> {
    let test_path = args
        .test
        .unwrap_or_else(|| PathBuf::from(&config.dataset.test_path));
    let limit = args.limit.or(config.dataset.test_limit);
    let test = load_articles(&test_path, limit)?;
    info!(path = %test_path.display(), items = test.len(), "test set loaded");

    let fallback = fallback_policy(config)?;
    let runner = BatchRunner::from_config(&config.run, &config.cost);
    let mut results: BTreeMap<String, RunStats> = BTreeMap::new();

    if args.strategy.baseline() {
        let strategy = BaselineStrategy::new(fallback.clone());
        let stats = runner.run(&test, &strategy).await?;
        results.insert("baseline".into(), stats);
    }

    if args.strategy.hybrid() {
        let prepared = prepare(config, args.train.as_deref()).await?;
        let strategy = HybridStrategy::new(prepared.router, fallback);
        let stats = runner.run(&test, &strategy).await?;
        results.insert("optimized".into(), stats);
    }

    for (name, stats) in &results {
        println!("{}", stats.summary(name));
    }
    for (name, stats) in &results {
        println!();
        println!("{name}");
        print!("{}", stats.report().render());
    }

    if let Some(path) = args.json {
        write_json(&path, &results)?;
        info!(path = %path.display(), "stats written");
    }
    Ok(())
}

/// Builds and calibrates the routes, then prints each route's threshold.
pub async fn calibrate(config: &SwitchyardConfig, train: Option<PathBuf>) -> Result<(), CommandError> {
    let prepared = prepare(config, train.as_deref()).await?;

    println!();
    println!("  {:<16} {:>6} {:>10} {:>10} {:>8} {:>8}", "route", "pairs", "before", "after", "acc0", "acc1");
    println!("  {}", "-".repeat(64));
    match &prepared.report {
        Some(report) => {
            for r in &report.routes {
                println!(
                    "  {:<16} {:>6} {:>10.4} {:>10.4} {:>8.3} {:>8.3}",
                    r.route,
                    r.pairs,
                    r.threshold_before,
                    r.threshold_after,
                    r.accuracy_before(),
                    r.accuracy_after()
                );
            }
            println!();
            println!(
                "  validation accuracy: {:.3} -> {:.3} over {} pairs",
                report.accuracy_before(),
                report.accuracy_after(),
                report.total_pairs
            );
        }
        None => {
            for route in prepared.router.routes().routes() {
                println!("  {:<16} {:>6} {:>10.4} {:>10}", route.name(), "-", route.threshold(), "-");
            }
            println!();
            println!("  uncalibrated: routing with default thresholds");
        }
    }
    println!();
    Ok(())
}

/// Prints the split sizes per category.
pub fn partition(config: &SwitchyardConfig, train: Option<PathBuf>) -> Result<(), CommandError> {
    let articles = load_train(config, train.as_deref())?;
    let cal = &config.calibration;
    let groups = group_by_category(&articles, &config.dataset.categories);
    let result = split(&groups, cal.ref_frac, cal.val_frac, cal.seed)
        .map_err(|e| PipelineError::new(switchyard_runner::Phase::Partition, e))?;

    println!();
    println!("  {:<16} {:>9} {:>10} {:>8} {:>6}", "category", "reference", "validation", "held-out", "total");
    println!("  {}", "-".repeat(53));
    for (category, part) in &result.categories {
        println!(
            "  {:<16} {:>9} {:>10} {:>8} {:>6}",
            category,
            part.reference.len(),
            part.validation.len(),
            part.held_out.len(),
            part.len()
        );
    }
    println!();
    Ok(())
}

fn load_train(config: &SwitchyardConfig, path: Option<&Path>) -> Result<Vec<Article>, SwitchyardError> {
    let path = path.map_or_else(|| PathBuf::from(&config.dataset.train_path), Path::to_path_buf);
    let articles = load_articles(&path, Some(config.dataset.train_limit))?;
    info!(path = %path.display(), items = articles.len(), "training set loaded");
    Ok(articles)
}

async fn prepare(config: &SwitchyardConfig, train: Option<&Path>) -> Result<PreparedRouter, CommandError> {
    let articles = load_train(config, train)?;
    let prepared = prepare_router(config, &articles, |endpoint: &EndpointConfig| {
        connect(config, endpoint)
    })
    .await?;
    Ok(prepared)
}

fn connect(
    config: &SwitchyardConfig,
    endpoint: &EndpointConfig,
) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError> {
    switchyard_embed::connect(&config.similarity, endpoint)
}

/// The fallback classifier, with the API key taken from the environment when unset.
pub fn fallback_classifier(config: &SwitchyardConfig) -> Result<ChatCompletionClassifier, SwitchyardError> {
    let mut fallback = config.fallback.clone();
    if fallback.api_key.is_none() {
        fallback.api_key = std::env::var(TOKEN_ENV).ok().filter(|k| !k.is_empty());
    }
    ChatCompletionClassifier::new(&fallback, &config.dataset.categories)
}

/// The fallback policy for this process, with the API key resolved once.
pub fn fallback_policy(config: &SwitchyardConfig) -> Result<FallbackPolicy, SwitchyardError> {
    let classifier = fallback_classifier(config)?;
    info!(model = classifier.model(), "fallback classifier ready");

    Ok(FallbackPolicy::new(Arc::new(classifier), ModelPricing::from(&config.cost))
        .with_timeout(config.run.item_timeout_secs.map(Duration::from_secs)))
}

fn write_json(path: &Path, results: &BTreeMap<String, RunStats>) -> Result<(), CommandError> {
    let output = |source| CommandError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(output)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), results)
        .map_err(|e| output(std::io::Error::other(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_runner::Phase;
    use switchyard_test_utils::fixtures::{labeled_articles, OUT_OF_DISTRIBUTION};

    #[test]
    fn both_selects_every_strategy() {
        assert!(StrategyChoice::Both.baseline() && StrategyChoice::Both.hybrid());
        assert!(!StrategyChoice::Baseline.hybrid());
        assert!(!StrategyChoice::Hybrid.baseline());
    }

    fn write_train(dir: &Path) -> PathBuf {
        let path = dir.join("train.csv");
        let mut body = String::from("ArticleId,Text,Category\n");
        for a in labeled_articles() {
            body.push_str(&format!("{},{},{}\n", a.id, a.text, a.category));
        }
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn partition_prints_split_for_training_file() {
        let dir = tempfile::tempdir().unwrap();
        let train = write_train(dir.path());
        partition(&SwitchyardConfig::default(), Some(train)).unwrap();
    }

    #[test]
    fn partition_rejects_oversized_fractions() {
        let dir = tempfile::tempdir().unwrap();
        let train = write_train(dir.path());
        let mut config = SwitchyardConfig::default();
        config.calibration.ref_frac = 0.8;
        config.calibration.val_frac = 0.4;
        let err = partition(&config, Some(train)).unwrap_err();
        assert!(
            matches!(&err, CommandError::Pipeline(e) if e.phase == Phase::Partition),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn calibrated_routes_send_references_home_and_reject_noise() {
        let dir = tempfile::tempdir().unwrap();
        let train = write_train(dir.path());
        let config = SwitchyardConfig::default();
        let prepared = prepare(&config, Some(&train)).await.unwrap();

        let routes = prepared.router.routes();
        assert!(routes.is_calibrated());
        for route in routes.routes() {
            assert!((0.0..=2.0).contains(&route.threshold()), "{}", route.name());
        }

        let politics = routes.get("politics").unwrap().references()[0].clone();
        let matched = prepared.router.route(&politics).await.unwrap().unwrap();
        assert_eq!(matched.name, "politics");
        assert!(matched.distance.abs() < 1e-6);

        for query in [OUT_OF_DISTRIBUTION, "quokka lighthouse nebula"] {
            assert!(prepared.router.route(query).await.unwrap().is_none(), "{query}");
        }
    }

    #[test]
    fn json_output_is_keyed_by_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut results = BTreeMap::new();
        results.insert("baseline".to_string(), RunStats::default());

        write_json(&path, &results).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["baseline"]["accuracy"], 0.0);
        assert!(value["baseline"]["responses"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unwritable_json_path_is_reported() {
        let err = write_json(Path::new("/nonexistent/dir/stats.json"), &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/stats.json"));
    }
}
