// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback classifier trait for the generative-model path.

use async_trait::async_trait;

use crate::error::SwitchyardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FallbackResponse;

/// Expensive classifier invoked when the similarity router abstains.
///
/// Implementations normalize their backend's response into
/// [`FallbackResponse`] before returning; nothing downstream sees
/// backend-specific shapes. Transport failures return
/// [`SwitchyardError::FallbackTransport`].
#[async_trait]
pub trait FallbackClassifier: PluginAdapter {
    /// Classifies one article text.
    async fn classify(&self, text: &str) -> Result<FallbackResponse, SwitchyardError>;
}
