// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generative fallback classifier for the Switchyard hybrid classifier.
//!
//! [`ChatCompletionClassifier`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint (the Hugging Face router by default), asks
//! for a JSON object restricted to the category enum, and normalizes
//! whatever comes back into a [`FallbackResponse`](switchyard_core::FallbackResponse).

pub mod client;
pub mod normalize;
pub mod types;

pub use client::ChatCompletionClassifier;
pub use normalize::{label_schema, normalize_content, UNKNOWN_LABEL};
