// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for tether.
//!
//! Two documents live here:
//!
//! - the per-environment **project file** (`{env}.tether.toml`) holding
//!   naming options, vault bindings and secret bindings, see [`project`];
//! - the user-level **tool configuration** (`tether.toml`) loaded through a
//!   Figment hierarchy with `TETHER_*` environment overrides, see [`loader`].
//!
//! Both reject unknown keys and report problems as miette diagnostics with
//! typo suggestions.

pub mod diagnostic;
pub mod dotenv;
pub mod loader;
pub mod locate;
pub mod model;
pub mod naming;
pub mod project;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TetherConfig;
pub use naming::ProjectOptions;
pub use project::{ProjectFile, ReconcileReport, SecretBinding, SecretView, Selection, VaultBinding};

/// Load the tool configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<TetherConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load the tool configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<TetherConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load the tool configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TetherConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    let system_path = std::path::Path::new(loader::SYSTEM_CONFIG);
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
