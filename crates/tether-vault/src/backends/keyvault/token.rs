// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer tokens for the management and data-plane APIs.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use tether_core::{Result, TetherError};
use tokio::process::Command;
use tracing::debug;

use super::KIND;

/// Issues bearer tokens for a resource audience.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Token for `resource`, scoped to `tenant` when given.
    async fn token(&self, resource: &str, tenant: Option<&str>) -> Result<SecretString>;
}

/// Obtains tokens from an already logged-in Azure CLI.
#[derive(Debug, Clone)]
pub struct AzCliTokenProvider {
    cli_path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
}

impl AzCliTokenProvider {
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for AzCliTokenProvider {
    async fn token(&self, resource: &str, tenant: Option<&str>) -> Result<SecretString> {
        let mut cmd = Command::new(&self.cli_path);
        cmd.args(["account", "get-access-token", "--resource", resource, "-o", "json"]);
        if let Some(tenant) = tenant {
            cmd.args(["--tenant", tenant]);
        }
        debug!(resource, tenant = tenant.unwrap_or("<home>"), "requesting access token from az cli");

        let output = cmd.output().await.map_err(|e| TetherError::Connectivity {
            backend: KIND.to_string(),
            message: format!("failed to run '{}': {e}", self.cli_path),
            source: Some(Box::new(e)),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TetherError::connectivity(
                KIND,
                format!("az cli could not issue a token (run 'az login'): {}", stderr.trim()),
            ));
        }
        let parsed: CliToken = serde_json::from_slice(&output.stdout)
            .map_err(|e| TetherError::connectivity(KIND, format!("unexpected az cli output: {e}")))?;
        Ok(SecretString::from(parsed.access_token))
    }
}

/// Hands out one fixed token. For tests and pre-issued credentials.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _resource: &str, _tenant: Option<&str>) -> Result<SecretString> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn missing_cli_is_a_connectivity_error() {
        let provider = AzCliTokenProvider::new("/nonexistent/az-cli-for-tests");
        let err = provider.token("https://vault.azure.net", None).await.unwrap_err();
        assert!(matches!(err, TetherError::Connectivity { .. }));
    }

    #[tokio::test]
    async fn static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc");
        let token = provider.token("r", Some("t")).await.unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }
}
