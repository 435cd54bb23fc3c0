// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly: partition, build routes, connect, calibrate.
//!
//! Each step runs in a named [`Phase`]; a fatal error reports the phase it
//! stopped in.

use std::sync::Arc;

use strum::Display;
use switchyard_config::model::EndpointConfig;
use switchyard_config::SwitchyardConfig;
use switchyard_core::{normalize_label, Article, SimilarityBackend, SwitchyardError};
use switchyard_dataset::{group_by_category, partition, Partition};
use switchyard_router::{
    build_routes, CalibratedRouteSet, CalibrationPair, CalibrationReport, RouteSet,
    SimilarityRouter, ThresholdOptimizer,
};
use thiserror::Error;
use tracing::{error, info, warn};

/// Query sent right after registration to surface an unreachable backend.
const WARMUP_QUERY: &str = "warmup";

/// Pipeline step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    Partition,
    Build,
    Calibrate,
    RouteConstruction,
}

/// A batch-fatal error tagged with the phase it occurred in.
#[derive(Debug, Error)]
#[error("{phase} phase failed: {source}")]
pub struct PipelineError {
    pub phase: Phase,
    #[source]
    pub source: SwitchyardError,
}

impl PipelineError {
    pub fn new(phase: Phase, source: SwitchyardError) -> Self {
        Self { phase, source }
    }
}

fn in_phase(phase: Phase) -> impl FnOnce(SwitchyardError) -> PipelineError {
    move |source| PipelineError::new(phase, source)
}

/// A router ready for queries, plus what went into it.
pub struct PreparedRouter {
    pub router: Arc<SimilarityRouter>,
    /// `None` when calibration was skipped under `allow_uncalibrated`.
    pub report: Option<CalibrationReport>,
    pub partition: Partition,
}

/// Reference texts per configured category, in configuration order.
///
/// Categories without references map to an empty list, which route
/// building rejects.
pub fn route_references(partition: &Partition, categories: &[String]) -> Vec<(String, Vec<String>)> {
    let mut references = partition.reference_texts();
    categories
        .iter()
        .map(|c| {
            let name = normalize_label(c);
            let refs = references.remove(&name).unwrap_or_default();
            (name, refs)
        })
        .collect()
}

/// One calibration pair per validation article.
pub fn calibration_pairs(partition: &Partition) -> Vec<CalibrationPair> {
    partition
        .validation()
        .map(|(category, article)| CalibrationPair::new(article.text.clone(), category))
        .collect()
}

/// Builds a calibrated router from `train`.
///
/// `connect` opens a backend at an endpoint. When the primary endpoint is
/// unreachable, construction is retried once against
/// `similarity.fallback_endpoint` if one is configured.
pub async fn prepare_router<F>(
    config: &SwitchyardConfig,
    train: &[Article],
    connect: F,
) -> Result<PreparedRouter, PipelineError>
where
    F: Fn(&EndpointConfig) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError>,
{
    let cal = &config.calibration;
    let categories = &config.dataset.categories;

    let groups = group_by_category(train, categories);
    let partition = partition(&groups, cal.ref_frac, cal.val_frac, cal.seed)
        .map_err(in_phase(Phase::Partition))?;

    let set = build_routes(route_references(&partition, categories), cal.default_threshold)
        .map_err(in_phase(Phase::Build))?;
    info!(routes = set.len(), threshold = cal.default_threshold, "routes built");

    let backend = construct_backend(config, &set, &connect)
        .await
        .map_err(in_phase(Phase::RouteConstruction))?;

    let pairs = calibration_pairs(&partition);
    let optimizer = ThresholdOptimizer::from_config(cal);
    let (routes, report) = match optimizer.calibrate(set.clone(), backend.as_ref(), &pairs).await {
        Ok((routes, report)) => {
            info!(
                pairs = report.total_pairs,
                accuracy_before = report.accuracy_before(),
                accuracy_after = report.accuracy_after(),
                "calibration complete"
            );
            (routes, Some(report))
        }
        Err(SwitchyardError::Calibration(message)) if cal.allow_uncalibrated => {
            warn!(%message, "calibration failed, routing with default thresholds");
            (CalibratedRouteSet::uncalibrated(set), None)
        }
        Err(err) if err.is_router_unavailable() => {
            return Err(PipelineError::new(Phase::RouteConstruction, err));
        }
        Err(err) => return Err(PipelineError::new(Phase::Calibrate, err)),
    };

    Ok(PreparedRouter {
        router: Arc::new(SimilarityRouter::new(backend, Arc::new(routes))),
        report,
        partition,
    })
}

async fn construct_backend<F>(
    config: &SwitchyardConfig,
    set: &RouteSet,
    connect: &F,
) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError>
where
    F: Fn(&EndpointConfig) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError>,
{
    let primary = config.similarity.endpoint();
    match register_and_warm(&primary, set, connect).await {
        Ok(backend) => Ok(backend),
        Err(err) if err.is_router_unavailable() => {
            error!(endpoint = %primary.address(), error = %err, "similarity backend unavailable");
            let Some(alternative) = &config.similarity.fallback_endpoint else {
                return Err(err);
            };
            warn!(endpoint = %alternative.address(), "retrying route construction");
            register_and_warm(alternative, set, connect).await
        }
        Err(err) => Err(err),
    }
}

async fn register_and_warm<F>(
    endpoint: &EndpointConfig,
    set: &RouteSet,
    connect: &F,
) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError>
where
    F: Fn(&EndpointConfig) -> Result<Arc<dyn SimilarityBackend>, SwitchyardError>,
{
    let backend = connect(endpoint)?;
    backend.register(&set.definitions()).await?;
    backend.distances(WARMUP_QUERY).await?;
    info!(backend = backend.name(), endpoint = %endpoint.address(), "similarity backend ready");
    Ok(backend)
}
