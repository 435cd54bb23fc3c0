// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Switchyard hybrid classifier.

use thiserror::Error;

/// The primary error type used across all Switchyard adapter traits and core operations.
#[derive(Debug, Error)]
pub enum SwitchyardError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset source errors (unreadable file, malformed CSV row).
    #[error("dataset error: {message}")]
    Dataset {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Split fractions that cannot partition a collection.
    #[error("invalid partition: {0}")]
    Partition(String),

    /// A category has no reference items at route-build time.
    #[error("route `{category}` has no reference items")]
    EmptyReferences { category: String },

    /// A route threshold outside the cosine distance range.
    #[error("threshold {threshold} for route `{route}` is outside [0, 2]")]
    InvalidThreshold { route: String, threshold: f32 },

    /// Validation data cannot calibrate the configured routes.
    #[error("calibration error: {0}")]
    Calibration(String),

    /// The similarity backend could not be reached.
    #[error("similarity backend unavailable at {endpoint}: {message}")]
    RouterUnavailable {
        endpoint: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The fallback model answered with content outside the label schema.
    #[error("malformed fallback response: {message}")]
    MalformedFallbackResponse { message: String },

    /// The fallback call itself failed (network, HTTP status, body read).
    #[error("fallback transport error: {message}")]
    FallbackTransport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwitchyardError {
    /// Returns true when the similarity backend could not be reached.
    pub fn is_router_unavailable(&self) -> bool {
        matches!(self, SwitchyardError::RouterUnavailable { .. })
    }

    /// Returns true for failures that are scored against a single item
    /// instead of aborting the batch.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            SwitchyardError::MalformedFallbackResponse { .. }
                | SwitchyardError::FallbackTransport { .. }
                | SwitchyardError::Timeout { .. }
        )
    }
}
