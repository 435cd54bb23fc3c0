// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock similarity backend for deterministic routing tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::traits::{PluginAdapter, SimilarityBackend};
use switchyard_core::{AdapterType, HealthStatus, RouteDefinition, RouteDistance, SwitchyardError};

/// A similarity backend that replays scripted distances.
///
/// Lookup order per `distances` call: a reply registered for the exact
/// query text, then the next queued reply, then an empty list (which makes
/// the router abstain). A backend built with [`MockBackend::unavailable`]
/// fails every call with `RouterUnavailable`.
pub struct MockBackend {
    queue: Mutex<VecDeque<Vec<RouteDistance>>>,
    by_text: Mutex<HashMap<String, Vec<RouteDistance>>>,
    registered: Mutex<Vec<RouteDefinition>>,
    unavailable_at: Option<String>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Create a reachable backend with no scripted replies.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            by_text: Mutex::new(HashMap::new()),
            registered: Mutex::new(Vec::new()),
            unavailable_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a backend pre-loaded with queued replies.
    pub fn with_distances(replies: Vec<Vec<RouteDistance>>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::from(replies)),
            ..Self::new()
        }
    }

    /// Create a backend that is never reachable.
    pub fn unavailable(endpoint: impl Into<String>) -> Self {
        Self {
            unavailable_at: Some(endpoint.into()),
            ..Self::new()
        }
    }

    /// Queue one reply.
    pub async fn push_distances(&self, distances: Vec<RouteDistance>) {
        self.queue.lock().await.push_back(distances);
    }

    /// Always answer `text` with `distances`.
    pub async fn respond_to(&self, text: impl Into<String>, distances: Vec<RouteDistance>) {
        self.by_text.lock().await.insert(text.into(), distances);
    }

    /// Routes passed to the most recent `register` call.
    pub async fn registered(&self) -> Vec<RouteDefinition> {
        self.registered.lock().await.clone()
    }

    /// Number of `distances` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn outage(&self) -> Option<SwitchyardError> {
        self.unavailable_at
            .as_ref()
            .map(|endpoint| SwitchyardError::RouterUnavailable {
                endpoint: endpoint.clone(),
                message: "connection refused".into(),
                source: None,
            })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for building a [`RouteDistance`].
pub fn distance(name: &str, distance: f32) -> RouteDistance {
    RouteDistance {
        name: name.to_string(),
        distance,
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Similarity
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        match &self.unavailable_at {
            Some(endpoint) => Ok(HealthStatus::Unhealthy(format!("{endpoint} unreachable"))),
            None => Ok(HealthStatus::Healthy),
        }
    }
}

#[async_trait]
impl SimilarityBackend for MockBackend {
    async fn register(&self, routes: &[RouteDefinition]) -> Result<(), SwitchyardError> {
        if let Some(err) = self.outage() {
            return Err(err);
        }
        *self.registered.lock().await = routes.to_vec();
        Ok(())
    }

    async fn distances(&self, text: &str) -> Result<Vec<RouteDistance>, SwitchyardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.outage() {
            return Err(err);
        }
        if let Some(reply) = self.by_text.lock().await.get(text) {
            return Ok(reply.clone());
        }
        Ok(self.queue.lock().await.pop_front().unwrap_or_default())
    }
}
