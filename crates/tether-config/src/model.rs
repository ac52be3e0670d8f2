// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool configuration model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in
//! `tether.toml` fails loudly instead of being ignored.

use serde::{Deserialize, Serialize};

/// Top-level user/tool configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Logging and default environment.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Discovery pipeline limits.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Export defaults.
    #[serde(default)]
    pub output: OutputConfig,

    /// Cloud key vault endpoints.
    #[serde(default)]
    pub keyvault: KeyVaultConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment used when `--env` is not given. Empty means the default env.
    #[serde(default)]
    pub default_env: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_env: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Upper bound on concurrent backend calls across all tiers.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// HTTP timeout for backend requests, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Writer used by `export` when `--to` is omitted.
    #[serde(default = "default_writer")]
    pub default_writer: String,

    /// Format used by `export` when `--as` is omitted.
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_writer: default_writer(),
            default_format: default_format(),
        }
    }
}

fn default_writer() -> String {
    "stdout".to_string()
}

fn default_format() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyVaultConfig {
    /// Resource manager endpoint.
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,

    /// Audience requested for data-plane tokens.
    #[serde(default = "default_vault_resource")]
    pub vault_resource: String,

    /// Azure CLI executable used to obtain access tokens.
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            management_endpoint: default_management_endpoint(),
            vault_resource: default_vault_resource(),
            cli_path: default_cli_path(),
        }
    }
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

fn default_vault_resource() -> String {
    "https://vault.azure.net".to_string()
}

fn default_cli_path() -> String {
    "az".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = TetherConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.discovery.max_concurrency, 8);
        assert_eq!(config.discovery.http_timeout_secs, 30);
        assert_eq!(config.output.default_writer, "stdout");
        assert_eq!(config.output.default_format, "auto");
        assert_eq!(config.keyvault.cli_path, "az");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: TetherConfig = toml::from_str("").unwrap();
        assert_eq!(config.discovery.max_concurrency, 8);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(toml::from_str::<TetherConfig>("[telemetry]\nenabled = true\n").is_err());
    }
}
