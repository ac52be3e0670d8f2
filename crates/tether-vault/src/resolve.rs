// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read and write paths over every binding of a project.

use std::collections::BTreeMap;

use tether_config::{ProjectFile, VaultBinding};
use tether_core::{RemoteSecret, Result, SecretContent, Vault};
use tracing::{debug, info, warn};

use crate::registry::VaultRegistry;

/// Opens the vault bound as `name` and checks connectivity.
pub async fn open_vault(
    project: &ProjectFile,
    registry: &VaultRegistry,
    name: &str,
) -> Result<Box<dyn Vault>> {
    let mut vault = registry.open(project.vault(name)?)?;
    vault.warmup().await?;
    Ok(vault)
}

/// Fresh remote listing of the vault bound as `name`.
pub async fn list_vault(
    project: &ProjectFile,
    registry: &VaultRegistry,
    name: &str,
) -> Result<(Box<dyn Vault>, Vec<RemoteSecret>)> {
    let vault = open_vault(project, registry, name).await?;
    vault.list_elevate().await?;
    let listing = vault.list().await?;
    debug!(vault = name, count = listing.len(), "listed remote secrets");
    Ok((vault, listing))
}

/// Pulls every enabled bound secret, in local key order.
///
/// Each content carries its local key. Disabled bindings are skipped.
pub async fn pull_bound(project: &ProjectFile, registry: &VaultRegistry) -> Result<Vec<SecretContent>> {
    let mut pulled = BTreeMap::new();
    for name in project.vault_names() {
        let bound: Vec<_> = project
            .secrets_for_vault(name)
            .filter(|(local, binding)| {
                if !binding.enabled {
                    warn!(secret = %local, vault = name, "skipping disabled secret");
                }
                binding.enabled
            })
            .collect();
        if bound.is_empty() {
            continue;
        }

        let vault = open_vault(project, registry, name).await?;
        vault.pull_elevate().await?;
        for (local, binding) in bound {
            let content = vault.pull(&binding.to_remote()).await?;
            pulled.insert(local.clone(), content.with_local_key(local));
        }
        info!(vault = name, "pulled secrets");
    }
    Ok(pulled.into_values().collect())
}

/// What a push sent and which vault bindings it changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Local keys pushed, sorted.
    pub pushed: Vec<String>,
    /// Vaults whose persisted configuration changed and needs saving.
    pub updated: Vec<String>,
}

/// Pushes local values of bound secrets.
///
/// Bound keys without a local value are skipped. A vault that records
/// pushed keys in its configuration has its binding rewritten in `project`;
/// the caller saves.
pub async fn push_bound(
    project: &mut ProjectFile,
    registry: &VaultRegistry,
    values: &BTreeMap<String, String>,
) -> Result<PushOutcome> {
    let mut outcome = PushOutcome::default();
    let names: Vec<String> = project.vault_names().into_iter().map(str::to_string).collect();
    for name in &names {
        let pending: Vec<(String, SecretContent)> = project
            .secrets_for_vault(name)
            .filter_map(|(local, binding)| match values.get(local) {
                Some(value) => Some((
                    local.clone(),
                    SecretContent::new(&binding.remote_key, value)
                        .with_content_type(&binding.content_type)
                        .with_local_key(local),
                )),
                None => {
                    warn!(secret = %local, "no local value to push");
                    None
                }
            })
            .collect();
        if pending.is_empty() {
            continue;
        }

        let vault = open_vault(project, registry, name).await?;
        vault.push_elevate().await?;
        for (local, content) in pending {
            vault.push(&content).await?;
            outcome.pushed.push(local);
        }
        if store_binding(project, name, &*vault)? {
            outcome.updated.push(name.clone());
        }
        info!(vault = %name, "pushed secrets");
    }
    outcome.pushed.sort();
    Ok(outcome)
}

/// Writes the vault's current configuration back into its binding.
///
/// Returns whether the binding changed.
pub fn store_binding(project: &mut ProjectFile, name: &str, vault: &dyn Vault) -> Result<bool> {
    let binding = VaultBinding::from_blob(vault.marshal())?;
    if project.vault(name)? == &binding {
        return Ok(false);
    }
    debug!(vault = name, "vault configuration changed");
    project.replace_vault(name, binding)?;
    Ok(true)
}
