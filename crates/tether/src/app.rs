// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state for one CLI invocation.

use tether_config::diagnostic::into_tether_error;
use tether_config::locate::Workspace;
use tether_config::naming::validate_env_name;
use tether_config::{ProjectFile, TetherConfig};
use tether_core::Result;
use tether_output::{builtin_exporter, Exporter};
use tether_security::{RedactingWriter, SecretList};
use tether_vault::{builtin_registry, VaultRegistry};
use tracing::debug;

/// Configuration, workspace and registries resolved once at startup.
#[derive(Debug)]
pub struct App {
    pub config: TetherConfig,
    pub workspace: Workspace,
    /// Selected environment. Empty is the default environment.
    pub env: String,
    pub registry: VaultRegistry,
    pub exporter: Exporter,
    secrets: SecretList,
}

impl App {
    /// Discovers the workspace from the current directory and registers
    /// every built-in backend, format and writer.
    pub fn new(config: TetherConfig, env: Option<&str>, secrets: SecretList) -> Result<Self> {
        let workspace = Workspace::discover()?;
        let registry = builtin_registry(&config)?;
        Self::with_parts(config, workspace, env, registry, secrets)
    }

    /// Builds an app from explicit parts.
    pub fn with_parts(
        config: TetherConfig,
        workspace: Workspace,
        env: Option<&str>,
        registry: VaultRegistry,
        secrets: SecretList,
    ) -> Result<Self> {
        let env = env
            .map(str::to_string)
            .unwrap_or_else(|| config.general.default_env.clone());
        validate_env_name(&env)?;
        let exporter = builtin_exporter()?;
        debug!(root = %workspace.root().display(), env = %env, "workspace ready");
        Ok(Self {
            config,
            workspace,
            env,
            registry,
            exporter,
            secrets,
        })
    }

    /// Loads the project file of the selected environment.
    pub fn project(&self) -> Result<ProjectFile> {
        ProjectFile::load(&self.workspace, &self.env).map_err(into_tether_error)
    }

    /// Marks `value` for redaction in log output.
    pub fn conceal(&self, value: &str) {
        RedactingWriter::<std::io::Stderr>::register(&self.secrets, value);
    }

    pub fn secrets(&self) -> &SecretList {
        &self.secrets
    }
}
