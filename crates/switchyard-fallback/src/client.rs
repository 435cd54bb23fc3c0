// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completions.
//!
//! Provides [`ChatCompletionClassifier`], which builds the classification
//! prompt, retries once on transient errors (429, 500, 503, 529), and drops
//! the structured-output request when the provider refuses it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use switchyard_config::model::FallbackConfig;
use switchyard_core::traits::{FallbackClassifier, PluginAdapter};
use switchyard_core::{AdapterType, FallbackResponse, HealthStatus, SwitchyardError, TokenUsage};
use tracing::{debug, warn};

use crate::normalize::{label_schema, normalize_content};
use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

/// Outcome of one HTTP exchange, before label parsing.
enum SendError {
    /// The provider rejected the request body (400/422).
    Rejected(StatusCode, String),
    Other(SwitchyardError),
}

/// Fallback classifier backed by a chat-completions endpoint.
#[derive(Debug)]
pub struct ChatCompletionClassifier {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
    has_credential: bool,
    model: String,
    categories: Vec<String>,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
    structured: AtomicBool,
}

impl ChatCompletionClassifier {
    /// Creates a classifier for the given category set.
    pub fn new(config: &FallbackConfig, categories: &[String]) -> Result<Self, SwitchyardError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    SwitchyardError::Config(format!("invalid API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SwitchyardError::FallbackTransport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let model = match &config.provider {
            Some(provider) if !provider.is_empty() => format!("{}:{provider}", config.model),
            _ => config.model.clone(),
        };

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            endpoint: format!("{base_url}/chat/completions"),
            base_url,
            has_credential: config.api_key.is_some(),
            model,
            categories: categories.to_vec(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
            structured: AtomicBool::new(true),
        })
    }

    /// Overrides the delay between transient retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Model identifier sent on the wire (`model[:provider]`).
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether requests still carry the JSON-schema response format.
    pub fn uses_structured_output(&self) -> bool {
        self.structured.load(Ordering::Relaxed)
    }

    fn request(&self, text: &str, structured: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(format!("Text:\n{text}")),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: structured.then(|| label_schema(&self.categories)),
        }
    }

    /// Sends one request, retrying once on transient statuses.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, SendError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying fallback request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    SendError::Other(SwitchyardError::FallbackTransport {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    })
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "fallback response received");

            if status.is_success() {
                return response.json::<ChatResponse>().await.map_err(|e| {
                    SendError::Other(SwitchyardError::FallbackTransport {
                        message: format!("failed to decode completion: {e}"),
                        source: Some(Box::new(e)),
                    })
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(format!("API returned {status}: {body}"));
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("API error ({status}): {}", api_err.error.message),
                Err(_) => format!("API returned {status}: {body}"),
            };
            if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) {
                return Err(SendError::Rejected(status, message));
            }
            return Err(SendError::Other(SwitchyardError::FallbackTransport {
                message,
                source: None,
            }));
        }

        Err(SendError::Other(SwitchyardError::FallbackTransport {
            message: last_error.unwrap_or_else(|| "fallback request failed after retries".into()),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[async_trait]
impl PluginAdapter for ChatCompletionClassifier {
    fn name(&self) -> &str {
        "chat-completion-fallback"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Fallback
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        if !self.has_credential {
            return Ok(HealthStatus::Degraded("no API key configured".into()));
        }
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "models endpoint returned {}",
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
impl FallbackClassifier for ChatCompletionClassifier {
    async fn classify(&self, text: &str) -> Result<FallbackResponse, SwitchyardError> {
        let structured = self.uses_structured_output();
        let response = match self.send(&self.request(text, structured)).await {
            Ok(response) => response,
            Err(SendError::Rejected(status, message)) if structured => {
                warn!(status = %status, %message, "provider refused structured output, retrying without schema");
                self.structured.store(false, Ordering::Relaxed);
                self.send(&self.request(text, false))
                    .await
                    .map_err(SendError::into_error)?
            }
            Err(err) => return Err(err.into_error()),
        };

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default();
        let predicted_label = normalize_content(content, &self.categories);
        if predicted_label.is_none() {
            warn!(content, "fallback answered outside the label schema");
        }

        Ok(FallbackResponse {
            predicted_label,
            usage,
        })
    }
}

impl SendError {
    fn into_error(self) -> SwitchyardError {
        match self {
            SendError::Rejected(_, message) => SwitchyardError::FallbackTransport {
                message,
                source: None,
            },
            SendError::Other(err) => err,
        }
    }
}
