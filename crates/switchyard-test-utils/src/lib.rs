// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchyard integration tests.
//!
//! Provides mock collaborators and fixtures for fast, deterministic,
//! CI-runnable tests without a similarity service or model endpoint.
//!
//! # Components
//!
//! - [`MockBackend`] - Similarity backend with scripted distances or outages
//! - [`MockFallback`] - Fallback classifier with a FIFO queue of replies
//! - [`fixtures`] - Five-category reference corpus and helpers

pub mod fixtures;
pub mod mock_backend;
pub mod mock_fallback;

pub use mock_backend::{distance, MockBackend};
pub use mock_fallback::{FallbackReply, MockFallback};
