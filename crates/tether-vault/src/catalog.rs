// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in backend catalog.

use std::sync::Arc;

use tether_config::TetherConfig;
use tether_core::{Result, Vault};

use crate::backends::keyvault::{self, KeyVault, KeyVaultSettings};
use crate::backends::memory::{self, MemoryBackend, MemoryVault};
use crate::registry::{VaultDescriptor, VaultRegistry};

/// Descriptors of every backend compiled into this build.
pub fn builtin_catalog() -> Vec<VaultDescriptor> {
    #[allow(unused_mut)]
    let mut catalog = vec![
        VaultDescriptor {
            kind: keyvault::KIND,
            display_name: "Azure Key Vault",
            description: "Cloud key vault discovered through tenants and subscriptions",
        },
        VaultDescriptor {
            kind: memory::KIND,
            display_name: "In-memory test vault",
            description: "Fixture stores for tests and demos",
        },
    ];
    #[cfg(feature = "keyring")]
    catalog.push(VaultDescriptor {
        kind: crate::backends::local::KIND,
        display_name: "OS keyring",
        description: "macOS Keychain, Windows Credential Manager or Secret Service",
    });
    catalog.sort_by_key(|d| d.kind);
    catalog
}

/// Registry with every built-in backend. In-memory vaults created from it
/// share one seeded [`MemoryBackend`].
pub fn builtin_registry(config: &TetherConfig) -> Result<VaultRegistry> {
    builtin_registry_with(config, Arc::new(MemoryBackend::seeded()))
}

/// Same as [`builtin_registry`] with a caller-provided memory backend.
pub fn builtin_registry_with(
    config: &TetherConfig,
    memory_backend: Arc<MemoryBackend>,
) -> Result<VaultRegistry> {
    let mut registry = VaultRegistry::new();
    for descriptor in builtin_catalog() {
        match descriptor.kind {
            keyvault::KIND => {
                let settings = KeyVaultSettings::from_config(config);
                registry.register(descriptor, move || -> Result<Box<dyn Vault>> {
                    Ok(Box::new(KeyVault::new(settings.clone())?))
                })?;
            }
            memory::KIND => {
                let backend = memory_backend.clone();
                registry.register(descriptor, move || -> Result<Box<dyn Vault>> {
                    Ok(Box::new(MemoryVault::new(backend.clone())))
                })?;
            }
            #[cfg(feature = "keyring")]
            crate::backends::local::KIND => {
                registry.register(descriptor, || -> Result<Box<dyn Vault>> {
                    Ok(Box::new(crate::backends::local::LocalVault::new()))
                })?;
            }
            _ => {}
        }
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_sorted() {
        let kinds: Vec<_> = builtin_catalog().iter().map(|d| d.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert!(kinds.contains(&"test"));
        assert!(kinds.contains(&"keyvault"));
    }

    #[test]
    fn registry_holds_every_catalog_entry() {
        let registry = builtin_registry(&TetherConfig::default()).unwrap();
        assert_eq!(registry.len(), builtin_catalog().len());
        assert_eq!(registry.create("keyvault").unwrap().display_name(), "Azure Key Vault");
    }

    #[tokio::test]
    async fn memory_vaults_share_backend() {
        let registry = builtin_registry(&TetherConfig::default()).unwrap();
        let mut blob = tether_core::ConfigBlob::new();
        blob.insert("store".into(), "mystore".into());

        let mut a = registry.create("test").unwrap();
        a.unmarshal(&blob).unwrap();
        a.push(&tether_core::SecretContent::new("shared", "v")).await.unwrap();

        let mut b = registry.create("test").unwrap();
        b.unmarshal(&blob).unwrap();
        let keys: Vec<_> = b.list().await.unwrap().into_iter().map(|s| s.remote_key).collect();
        assert!(keys.contains(&"shared".to_string()));
    }
}
