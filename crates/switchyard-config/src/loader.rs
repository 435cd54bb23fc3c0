// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Hierarchy: `./switchyard.toml` > `~/.config/switchyard/switchyard.toml` >
//! `/etc/switchyard/switchyard.toml`, with `SWITCHYARD_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::SwitchyardConfig;

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "switchyard.toml";

/// System-wide config file path.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/switchyard/switchyard.toml";

/// Sections that environment keys may address, in lookup order.
const SECTIONS: &[&str] = &[
    "log",
    "dataset",
    "calibration",
    "similarity",
    "fallback",
    "cost",
    "run",
];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("switchyard").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/switchyard/switchyard.toml`
/// 3. `~/.config/switchyard/switchyard.toml`
/// 4. `./switchyard.toml`
/// 5. `SWITCHYARD_*` environment variables
pub fn load_config() -> Result<SwitchyardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SwitchyardConfig, figment::Error> {
    debug!(path = %path.display(), "loading config from explicit path");
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchical loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
///
/// Only the section prefix becomes a dot, so underscore-containing field
/// names survive: `fallback_api_key` -> `fallback.api_key`. The nested
/// `similarity.fallback_endpoint` table gets its own split.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        else {
            continue;
        };
        if *section == "similarity"
            && let Some(field) = rest.strip_prefix("fallback_endpoint_")
        {
            return format!("similarity.fallback_endpoint.{field}");
        }
        return format!("{section}.{rest}");
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("SWITCHYARD_").map(|key| map_env_key(key.as_str()).into())
}
