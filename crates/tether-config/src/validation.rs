// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! Both entry points collect every problem instead of failing fast.

use std::collections::BTreeMap;

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::TetherConfig;
use crate::naming::is_env_var_name;
use crate::project::ProjectFile;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate the tool configuration.
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.general.log_level
            ),
        });
    }

    if config.discovery.max_concurrency == 0 {
        errors.push(ConfigError::Validation {
            message: "discovery.max_concurrency must be at least 1".to_string(),
        });
    }

    if config.discovery.http_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "discovery.http_timeout_secs must be greater than 0".to_string(),
        });
    }

    for (key, value) in [
        ("keyvault.management_endpoint", &config.keyvault.management_endpoint),
        ("keyvault.vault_resource", &config.keyvault.vault_resource),
    ] {
        if !is_secure_endpoint(value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be an https URL, got `{value}`"),
            });
        }
    }

    if config.keyvault.cli_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "keyvault.cli_path must not be empty".to_string(),
        });
    }

    if config.output.default_writer.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "output.default_writer must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_secure_endpoint(value: &str) -> bool {
    value.starts_with("https://")
        || value.starts_with("http://localhost")
        || value.starts_with("http://127.0.0.1")
}

/// Validate a loaded project file against the registered backend types.
pub fn validate_project(project: &ProjectFile, known_types: &[&str]) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (name, binding) in project.vaults() {
        if !known_types.iter().any(|t| t.eq_ignore_ascii_case(&binding.kind)) {
            errors.push(ConfigError::UnknownVaultType {
                vault: name.clone(),
                kind: binding.kind.clone(),
                suggestion: suggest_key(&binding.kind, known_types),
                valid_types: known_types.join(", "),
            });
        }
    }

    let mut seen: BTreeMap<(&str, &str), &str> = BTreeMap::new();
    for (local, secret) in project.secrets() {
        if !is_env_var_name(local) {
            errors.push(ConfigError::Validation {
                message: format!("secret `{local}` is not a valid environment variable name"),
            });
        }
        if !project.vaults().contains_key(&secret.vault) {
            errors.push(ConfigError::Validation {
                message: format!("secret `{local}` refers to unknown vault `{}`", secret.vault),
            });
        }
        if secret.remote_key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("secret `{local}` has an empty remote_key"),
            });
        }
        if let Some(first) = seen.insert((secret.vault.as_str(), secret.remote_key.as_str()), local) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "`{}` in vault `{}` is bound twice ({first} and {local})",
                    secret.remote_key, secret.vault
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
