// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Switchyard hybrid classifier.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Switchyard configuration.
///
/// Loaded once at process start from TOML files following the XDG hierarchy,
/// with environment variable overrides, then passed into component
/// constructors. Every section is optional and defaults to the values the
/// BBC news benchmark was tuned with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Dataset locations, limits, and the fixed category set.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Split fractions and threshold calibration settings.
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Similarity backend settings.
    #[serde(default)]
    pub similarity: SimilarityConfig,

    /// Generative fallback settings.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Per-token pricing used for cost accounting.
    #[serde(default)]
    pub cost: CostConfig,

    /// Batch execution settings.
    #[serde(default)]
    pub run: RunConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Dataset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Labeled CSV used for reference, validation, and held-out splits.
    #[serde(default = "default_train_path")]
    pub train_path: String,

    /// CSV of articles to classify.
    #[serde(default = "default_test_path")]
    pub test_path: String,

    /// Maximum number of training rows read before grouping by category.
    #[serde(default = "default_train_limit")]
    pub train_limit: usize,

    /// Maximum number of test rows to classify. `None` classifies all rows.
    #[serde(default)]
    pub test_limit: Option<usize>,

    /// The fixed category set. The fallback schema adds `unknown`.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            train_path: default_train_path(),
            test_path: default_test_path(),
            train_limit: default_train_limit(),
            test_limit: None,
            categories: default_categories(),
        }
    }
}

fn default_train_path() -> String {
    "data/bbc-news-articles-labeled/BBC News Train.csv".to_string()
}

fn default_test_path() -> String {
    "data/bbc-news-articles-labeled/BBC News Test.csv".to_string()
}

fn default_train_limit() -> usize {
    1000
}

fn default_categories() -> Vec<String> {
    ["politics", "sport", "tech", "business", "entertainment"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// How the threshold optimizer enumerates candidate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Candidates are the distances observed on the validation split.
    Observed,
    /// Candidates are evenly spaced points over the distance range.
    Sweep,
}

/// Partitioning and threshold calibration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    /// Fraction of each category used as route references.
    #[serde(default = "default_ref_frac")]
    pub ref_frac: f64,

    /// Fraction of each category used for threshold calibration.
    /// The remainder is held out.
    #[serde(default = "default_val_frac")]
    pub val_frac: f64,

    /// Seed for the per-category shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Starting distance threshold for every route (cosine distance, 0.0-2.0).
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Candidate enumeration strategy.
    #[serde(default = "default_search")]
    pub search: SearchStrategy,

    /// Number of sweep intervals when `search = "sweep"`.
    #[serde(default = "default_sweep_steps")]
    pub sweep_steps: usize,

    /// Route on default thresholds when calibration fails instead of aborting.
    #[serde(default)]
    pub allow_uncalibrated: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            ref_frac: default_ref_frac(),
            val_frac: default_val_frac(),
            seed: default_seed(),
            default_threshold: default_threshold(),
            search: default_search(),
            sweep_steps: default_sweep_steps(),
            allow_uncalibrated: false,
        }
    }
}

fn default_ref_frac() -> f64 {
    0.6
}

fn default_val_frac() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_threshold() -> f32 {
    0.5
}

fn default_search() -> SearchStrategy {
    SearchStrategy::Observed
}

fn default_sweep_steps() -> usize {
    200
}

/// Which similarity backend implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process index over the hashing embedder.
    Local,
    /// Remote similarity service reached over HTTP.
    Remote,
}

/// How per-reference distances are folded into one route distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Distance to the closest reference.
    Min,
    /// Mean distance over all references.
    Avg,
}

/// A network endpoint with an optional credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
}

impl EndpointConfig {
    /// `host:port`, used in logs and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL for HTTP access.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Similarity backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Backend implementation.
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Name under which the route set is registered.
    #[serde(default = "default_router_name")]
    pub router_name: String,

    /// Primary backend host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Primary backend port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Primary backend credential.
    #[serde(default)]
    pub password: Option<String>,

    /// Endpoint tried once when the primary backend is unreachable.
    #[serde(default)]
    pub fallback_endpoint: Option<EndpointConfig>,

    /// Per-route distance aggregation.
    #[serde(default = "default_aggregation")]
    pub aggregation: Aggregation,

    /// Dimensionality of the local hashing embedder.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Request timeout for the remote backend in seconds.
    #[serde(default = "default_similarity_timeout_secs")]
    pub timeout_secs: u64,
}

impl SimilarityConfig {
    /// The primary endpoint as an [`EndpointConfig`].
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            router_name: default_router_name(),
            host: default_host(),
            port: default_port(),
            password: None,
            fallback_endpoint: None,
            aggregation: default_aggregation(),
            embedding_dim: default_embedding_dim(),
            timeout_secs: default_similarity_timeout_secs(),
        }
    }
}

fn default_backend() -> BackendKind {
    BackendKind::Local
}

fn default_router_name() -> String {
    "article-router".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_aggregation() -> Aggregation {
    Aggregation::Min
}

fn default_embedding_dim() -> usize {
    1024
}

fn default_similarity_timeout_secs() -> u64 {
    10
}

/// Generative fallback configuration.
///
/// Targets any OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. `None` sends no authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_fallback_model")]
    pub model: String,

    /// Inference provider suffix appended as `model:provider`.
    #[serde(default = "default_provider")]
    pub provider: Option<String>,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap.
    #[serde(default = "default_fallback_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_fallback_timeout_secs")]
    pub timeout_secs: u64,

    /// System instruction sent before the article text.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_fallback_model(),
            provider: default_provider(),
            temperature: default_temperature(),
            max_tokens: default_fallback_max_tokens(),
            timeout_secs: default_fallback_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_fallback_model() -> String {
    "meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_provider() -> Option<String> {
    Some("nscale".to_string())
}

fn default_temperature() -> f32 {
    0.2
}

fn default_fallback_max_tokens() -> u32 {
    16
}

fn default_fallback_timeout_secs() -> u64 {
    30
}

fn default_system_prompt() -> String {
    "Classify the article from one label from the enum and return JSON only.".to_string()
}

/// Per-token pricing in USD per million tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Cost per million prompt tokens.
    #[serde(default = "default_input_per_mtok")]
    pub input_per_mtok: f64,

    /// Cost per million completion tokens.
    #[serde(default = "default_output_per_mtok")]
    pub output_per_mtok: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            input_per_mtok: default_input_per_mtok(),
            output_per_mtok: default_output_per_mtok(),
        }
    }
}

fn default_input_per_mtok() -> f64 {
    0.09
}

fn default_output_per_mtok() -> f64 {
    0.29
}

/// Batch execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of items in flight at once. 1 is strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-item fallback timeout in seconds. `None` waits indefinitely.
    #[serde(default)]
    pub item_timeout_secs: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            item_timeout_secs: None,
        }
    }
}

fn default_concurrency() -> usize {
    1
}
