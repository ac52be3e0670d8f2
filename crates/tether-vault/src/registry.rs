// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault registry.
//!
//! A closed table of backend types, built once at startup by
//! [`crate::catalog::builtin_registry`] and passed to whatever needs to turn
//! a persisted [`VaultBinding`] back into a live [`Vault`].

use std::collections::BTreeMap;

use tether_config::VaultBinding;
use tether_config::diagnostic::suggest_key;
use tether_core::{Result, TetherError, Vault};
use tracing::debug;

/// Static metadata about a backend type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultDescriptor {
    /// Type tag, written as `type` in project files.
    pub kind: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Builds unconfigured vault instances.
pub trait VaultFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Vault>>;
}

impl<F> VaultFactory for F
where
    F: Fn() -> Result<Box<dyn Vault>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Vault>> {
        self()
    }
}

/// A registered backend type.
pub struct VaultEntry {
    pub descriptor: VaultDescriptor,
    factory: Box<dyn VaultFactory>,
}

impl std::fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Backend types keyed by lowercase type tag.
#[derive(Debug, Default)]
pub struct VaultRegistry {
    entries: BTreeMap<String, VaultEntry>,
}

impl VaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend type. Registering a tag twice is a programming
    /// error.
    pub fn register(
        &mut self,
        descriptor: VaultDescriptor,
        factory: impl VaultFactory + 'static,
    ) -> Result<()> {
        let key = descriptor.kind.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Err(TetherError::Internal(format!(
                "vault type '{}' registered twice",
                descriptor.kind
            )));
        }
        self.entries.insert(
            key,
            VaultEntry {
                descriptor,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, kind: &str) -> Result<&VaultEntry> {
        self.entries
            .get(&kind.to_ascii_lowercase())
            .ok_or_else(|| self.unknown(kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(&kind.to_ascii_lowercase())
    }

    /// Registered type tags, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.entries.values().map(|e| e.descriptor.kind).collect()
    }

    /// All entries, sorted by type tag.
    pub fn list_all(&self) -> Vec<&VaultEntry> {
        self.entries.values().collect()
    }

    /// A fresh, unconfigured vault of type `kind`, ready for its wizard.
    pub fn create(&self, kind: &str) -> Result<Box<dyn Vault>> {
        self.get(kind)?.factory.create()
    }

    /// Reconstructs the vault a project binding describes.
    pub fn open(&self, binding: &VaultBinding) -> Result<Box<dyn Vault>> {
        let mut vault = self.create(&binding.kind)?;
        vault.unmarshal(&binding.to_blob())?;
        debug!(vault = %vault.describe(), "opened vault");
        Ok(vault)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unknown(&self, kind: &str) -> TetherError {
        let known = self.kinds();
        let name = match suggest_key(&kind.to_ascii_lowercase(), &known) {
            Some(hint) => format!("{kind} (did you mean '{hint}'?)"),
            None => format!("{kind} (known: {})", known.join(", ")),
        };
        TetherError::not_found("vault type", name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backends::memory::{MemoryBackend, MemoryVault};
    use tether_core::ConfigBlob;

    fn registry() -> VaultRegistry {
        let backend = Arc::new(MemoryBackend::seeded());
        let mut registry = VaultRegistry::new();
        registry
            .register(
                VaultDescriptor {
                    kind: "test",
                    display_name: "In-memory test vault",
                    description: "Fixture stores for tests",
                },
                move || -> Result<Box<dyn Vault>> { Ok(Box::new(MemoryVault::new(backend.clone()))) },
            )
            .unwrap();
        registry
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = registry();
        assert!(registry.contains("TEST"));
        assert_eq!(registry.create("Test").unwrap().kind(), "test");
    }

    #[test]
    fn unknown_type_suggests_close_match() {
        let Err(err) = registry().create("tset") else {
            panic!("misspelled type created a vault");
        };
        assert!(matches!(err, TetherError::NotFound { .. }));
        assert!(err.to_string().contains("did you mean 'test'"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(
                VaultDescriptor {
                    kind: "TEST",
                    display_name: "again",
                    description: "",
                },
                || -> Result<Box<dyn Vault>> { Err(TetherError::Internal("unused".into())) },
            )
            .unwrap_err();
        assert!(err.to_string().contains("registered twice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn open_restores_binding() {
        let mut config = ConfigBlob::new();
        config.insert("store".into(), "otherstore".into());
        let binding = VaultBinding {
            kind: "test".into(),
            config,
        };
        let vault = registry().open(&binding).unwrap();
        assert_eq!(vault.describe(), "test: otherstore");
        assert_eq!(VaultBinding::from_blob(vault.marshal()).unwrap(), binding);
    }

    #[test]
    fn open_rejects_incomplete_binding() {
        let binding = VaultBinding {
            kind: "test".into(),
            config: ConfigBlob::new(),
        };
        let Err(err) = registry().open(&binding) else {
            panic!("binding without a store opened");
        };
        assert!(err.is_validation());
    }
}
