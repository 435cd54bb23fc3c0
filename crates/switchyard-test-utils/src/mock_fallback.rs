// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock fallback classifier for deterministic testing.
//!
//! `MockFallback` implements `FallbackClassifier` with pre-configured
//! replies, so runner tests need no model endpoint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::traits::{FallbackClassifier, PluginAdapter};
use switchyard_core::{AdapterType, FallbackResponse, HealthStatus, SwitchyardError, TokenUsage};

/// Token usage attached to replies that do not specify their own.
pub const DEFAULT_USAGE: TokenUsage = TokenUsage {
    prompt_tokens: 100,
    completion_tokens: 5,
};

/// One scripted fallback reply.
#[derive(Debug, Clone)]
pub enum FallbackReply {
    /// A parsed label with its billed usage.
    Label(String, TokenUsage),
    /// Content outside the label schema; usage is still billed.
    Malformed(TokenUsage),
    /// The call itself fails.
    Transport(String),
    /// Sleep, then answer with the inner reply.
    Delayed(Duration, Box<FallbackReply>),
}

impl FallbackReply {
    /// A label billed at [`DEFAULT_USAGE`].
    pub fn label(label: impl Into<String>) -> Self {
        FallbackReply::Label(label.into(), DEFAULT_USAGE)
    }
}

/// A fallback classifier that pops replies from a FIFO queue.
///
/// When the queue is empty it answers `unknown` at [`DEFAULT_USAGE`].
pub struct MockFallback {
    replies: Mutex<VecDeque<FallbackReply>>,
    seen: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockFallback {
    /// Create a mock with an empty reply queue.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<FallbackReply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, reply: FallbackReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `classify` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to `classify`, in call order.
    pub async fn seen(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }

    async fn next_reply(&self) -> FallbackReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| FallbackReply::label("unknown"))
    }
}

impl Default for MockFallback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockFallback {
    fn name(&self) -> &str {
        "mock-fallback"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Fallback
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl FallbackClassifier for MockFallback {
    async fn classify(&self, text: &str) -> Result<FallbackResponse, SwitchyardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().await.push(text.to_string());

        let mut reply = self.next_reply().await;
        loop {
            return match reply {
                FallbackReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                    continue;
                }
                FallbackReply::Label(label, usage) => Ok(FallbackResponse {
                    predicted_label: Some(label),
                    usage,
                }),
                FallbackReply::Malformed(usage) => Ok(FallbackResponse {
                    predicted_label: None,
                    usage,
                }),
                FallbackReply::Transport(message) => Err(SwitchyardError::FallbackTransport {
                    message,
                    source: None,
                }),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pops_replies_in_order_then_defaults() {
        let mock = MockFallback::with_replies(vec![
            FallbackReply::label("sport"),
            FallbackReply::Malformed(TokenUsage::default()),
        ]);

        let first = mock.classify("a").await.unwrap();
        assert_eq!(first.predicted_label.as_deref(), Some("sport"));
        assert_eq!(first.usage, DEFAULT_USAGE);
        assert!(mock.classify("b").await.unwrap().predicted_label.is_none());
        assert_eq!(
            mock.classify("c").await.unwrap().predicted_label.as_deref(),
            Some("unknown")
        );
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.seen().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn transport_reply_is_an_error() {
        let mock = MockFallback::with_replies(vec![FallbackReply::Transport("reset".into())]);
        let err = mock.classify("a").await.unwrap_err();
        assert!(err.is_item_scoped());
    }
}
