// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a remote similarity service.
//!
//! Wire protocol (JSON over HTTP):
//! - `POST {base}/routers/{name}/routes` with `{"routes": [{"name", "references"}]}`
//! - `POST {base}/routers/{name}/distances` with `{"text"}`, answering
//!   `{"distances": [{"name", "distance"}]}`
//! - `GET {base}/health`
//!
//! Connection failures, timeouts and 5xx answers surface as
//! [`SwitchyardError::RouterUnavailable`] so the pipeline can retry against
//! another endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use switchyard_config::model::EndpointConfig;
use switchyard_core::traits::{PluginAdapter, SimilarityBackend};
use switchyard_core::{AdapterType, HealthStatus, RouteDefinition, RouteDistance, SwitchyardError};
use tracing::debug;

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    routes: &'a [RouteDefinition],
}

#[derive(Debug, Serialize)]
struct DistanceRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct DistanceResponse {
    distances: Vec<RouteDistance>,
}

/// Similarity backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
    router_name: String,
    password: Option<String>,
}

impl RemoteBackend {
    /// Creates a client for the service at `endpoint`.
    pub fn new(
        endpoint: &EndpointConfig,
        router_name: &str,
        timeout: Duration,
    ) -> Result<Self, SwitchyardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwitchyardError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: endpoint.base_url(),
            router_name: router_name.to_string(),
            password: endpoint.password.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn router_url(&self, suffix: &str) -> String {
        format!("{}/routers/{}/{suffix}", self.base_url, self.router_name)
    }

    fn unavailable(&self, message: String, source: Option<reqwest::Error>) -> SwitchyardError {
        SwitchyardError::RouterUnavailable {
            endpoint: self.base_url.clone(),
            message,
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, SwitchyardError> {
        let mut request = self.client.post(url).json(body);
        if let Some(password) = &self.password {
            request = request.bearer_auth(password);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {e}"), Some(e)))?;

        let status = response.status();
        debug!(status = %status, url, "similarity service responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(self.unavailable(format!("service returned {status}: {body}"), None))
        } else {
            Err(SwitchyardError::Internal(format!(
                "similarity service rejected request ({status}): {body}"
            )))
        }
    }
}

#[async_trait]
impl PluginAdapter for RemoteBackend {
    fn name(&self) -> &str {
        "remote-similarity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Similarity
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "health endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{} unreachable: {e}",
                self.base_url
            ))),
        }
    }
}

#[async_trait]
impl SimilarityBackend for RemoteBackend {
    async fn register(&self, routes: &[RouteDefinition]) -> Result<(), SwitchyardError> {
        self.post(&self.router_url("routes"), &RegisterRequest { routes })
            .await?;
        debug!(router = %self.router_name, routes = routes.len(), "registered routes remotely");
        Ok(())
    }

    async fn distances(&self, text: &str) -> Result<Vec<RouteDistance>, SwitchyardError> {
        let response = self
            .post(&self.router_url("distances"), &DistanceRequest { text })
            .await?;
        let parsed: DistanceResponse = response
            .json()
            .await
            .map_err(|e| SwitchyardError::Internal(format!("invalid distances payload: {e}")))?;
        Ok(parsed.distances)
    }
}
