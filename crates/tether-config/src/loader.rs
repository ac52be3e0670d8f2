// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool configuration loader using Figment for layered merging.
//!
//! Hierarchy: `./tether.toml` > `~/.config/tether/tether.toml` >
//! `/etc/tether/tether.toml`, with `TETHER_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TetherConfig;

/// Local configuration file name.
pub const LOCAL_CONFIG: &str = "tether.toml";

/// System-wide configuration path.
pub const SYSTEM_CONFIG: &str = "/etc/tether/tether.toml";

/// Per-user configuration path under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tether").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tether/tether.toml`
/// 3. `~/.config/tether/tether.toml`
/// 4. `./tether.toml`
/// 5. `TETHER_*` environment variables
pub fn load_config() -> Result<TetherConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only.
pub fn load_config_from_str(toml_content: &str) -> Result<TetherConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TetherConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `TETHER_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `split("_")` because key names contain
/// underscores: `TETHER_DISCOVERY_MAX_CONCURRENCY` must become
/// `discovery.max_concurrency`.
fn env_provider() -> Env {
    Env::prefixed("TETHER_").map(|key| env_key_path(key.as_str()).into())
}

const SECTIONS: [&str; 4] = ["general", "discovery", "output", "keyvault"];

/// `DISCOVERY_MAX_CONCURRENCY` -> `discovery.max_concurrency`.
///
/// Keys arrive in their original case. Names without a known section
/// prefix are passed through lowercased.
fn env_key_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    match key.split_once('_') {
        Some((section, rest)) if SECTIONS.contains(&section) && !rest.is_empty() => {
            format!("{section}.{rest}")
        }
        _ => key,
    }
}
