// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vault used by tests and demos.
//!
//! All instances built by one registry share a [`MemoryBackend`], so a
//! value pushed through one vault is visible to another bound to the same
//! store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tether_core::types::DEFAULT_CONTENT_TYPE;
use tether_core::{
    ConfigBlob, FormAnswers, FormField, FormOption, FormSpec, RemoteSecret, Result, SecretContent,
    TetherError, Vault, WizardArgs, WizardMachine, WizardState,
};
use tracing::{debug, warn};

use super::{blob_string, check_blob_type};
use crate::wizard::{take_arg, text_answer, warn_unused_args};

pub const KIND: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredSecret {
    value: String,
    content_type: String,
    enabled: bool,
}

impl StoredSecret {
    fn new(value: &str, enabled: bool) -> Self {
        Self {
            value: value.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            enabled,
        }
    }
}

type Store = BTreeMap<String, StoredSecret>;

/// Named stores of secrets.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stores: RwLock<BTreeMap<String, Store>>,
}

impl MemoryBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixture data every test relies on.
    pub fn seeded() -> Self {
        let mut stores = BTreeMap::new();
        for (store, key, value, enabled) in [
            ("mystore", "mykey", "myvalue", true),
            ("mystore", "hiddenkey", "hiddenvalue", false),
            ("otherstore", "mykey", "myothervalue", true),
            ("otherstore", "disabledkey", "disabledvalue", false),
            ("otherstore", "retiredkey", "retiredvalue", false),
        ] {
            put(&mut stores, store, key, value, enabled);
        }
        Self {
            stores: RwLock::new(stores),
        }
    }

    /// Adds or replaces a secret, creating the store if needed.
    pub fn insert(&self, store: &str, key: &str, value: &str, enabled: bool) -> Result<()> {
        let mut stores = self
            .stores
            .write()
            .map_err(|_| TetherError::Internal("memory backend poisoned".into()))?;
        put(&mut stores, store, key, value, enabled);
        Ok(())
    }

    /// Drops a whole store. Returns whether it existed.
    pub fn remove_store(&self, store: &str) -> Result<bool> {
        let mut stores = self
            .stores
            .write()
            .map_err(|_| TetherError::Internal("memory backend poisoned".into()))?;
        Ok(stores.remove(store).is_some())
    }

    /// Store names, sorted.
    pub fn store_names(&self) -> Vec<String> {
        self.stores
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_store(&self, store: &str) -> bool {
        self.stores.read().map(|s| s.contains_key(store)).unwrap_or(false)
    }

    fn read_store<T>(&self, store: &str, f: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let stores = self
            .stores
            .read()
            .map_err(|_| TetherError::Internal("memory backend poisoned".into()))?;
        let store = stores
            .get(store)
            .ok_or_else(|| TetherError::not_found("store", store))?;
        f(store)
    }

    fn write_store(&self, store: &str, f: impl FnOnce(&mut Store)) -> Result<()> {
        let mut stores = self
            .stores
            .write()
            .map_err(|_| TetherError::Internal("memory backend poisoned".into()))?;
        let store = stores
            .get_mut(store)
            .ok_or_else(|| TetherError::not_found("store", store))?;
        f(store);
        Ok(())
    }
}

fn put(stores: &mut BTreeMap<String, Store>, store: &str, key: &str, value: &str, enabled: bool) {
    stores
        .entry(store.to_string())
        .or_default()
        .insert(key.to_string(), StoredSecret::new(value, enabled));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Store,
}

/// Vault bound to one store of a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryVault {
    backend: Arc<MemoryBackend>,
    store: Option<String>,
    wizard: WizardMachine<Step>,
    draft_store: Option<String>,
}

impl MemoryVault {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        Self {
            backend,
            store: None,
            wizard: WizardMachine::new(),
            draft_store: None,
        }
    }

    /// Shorthand for a vault already bound to `store`.
    pub fn with_store(backend: Arc<MemoryBackend>, store: &str) -> Self {
        let mut vault = Self::new(backend);
        vault.store = Some(store.to_string());
        vault
    }

    fn store(&self) -> Result<&str> {
        self.store
            .as_deref()
            .ok_or_else(|| TetherError::Validation("test vault has no store configured".into()))
    }

    fn form(&self, step: Step) -> FormSpec {
        match step {
            Step::Store => {
                let options = self
                    .backend
                    .store_names()
                    .into_iter()
                    .map(|name| FormOption::new(name.clone(), name))
                    .collect();
                FormSpec::new("store", "Test vault").field(
                    FormField::select("store", "Store", options)
                        .describe("In-memory store to bind"),
                )
            }
        }
    }
}

#[async_trait]
impl Vault for MemoryVault {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn display_name(&self) -> &'static str {
        "In-memory test vault"
    }

    fn describe(&self) -> String {
        format!("{KIND}: {}", self.store.as_deref().unwrap_or("<unset>"))
    }

    async fn warmup(&mut self) -> Result<()> {
        let store = self.store()?;
        if !self.backend.has_store(store) {
            return Err(TetherError::connectivity(
                KIND,
                format!("store '{store}' does not exist"),
            ));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RemoteSecret>> {
        self.backend.read_store(self.store()?, |store| {
            Ok(store
                .iter()
                .map(|(key, s)| RemoteSecret::new(key, &s.content_type, s.enabled))
                .collect())
        })
    }

    async fn pull(&self, secret: &RemoteSecret) -> Result<SecretContent> {
        self.backend.read_store(self.store()?, |store| {
            let stored = store
                .get(&secret.remote_key)
                .ok_or_else(|| TetherError::not_found("secret", &secret.remote_key))?;
            if !stored.enabled {
                return Err(TetherError::Validation(format!(
                    "secret '{}' is disabled",
                    secret.remote_key
                )));
            }
            Ok(SecretContent::new(&secret.remote_key, &stored.value)
                .with_content_type(&stored.content_type))
        })
    }

    async fn push(&self, content: &SecretContent) -> Result<()> {
        let store = self.store()?;
        debug!(store, key = %content.remote_key, "storing secret");
        self.backend.write_store(store, |s| {
            s.insert(
                content.remote_key.clone(),
                StoredSecret {
                    value: content.expose().to_string(),
                    content_type: content.content_type.clone(),
                    enabled: true,
                },
            );
        })
    }

    fn marshal(&self) -> ConfigBlob {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        if let Some(store) = &self.store {
            blob.insert("store".into(), store.as_str().into());
        }
        blob
    }

    fn unmarshal(&mut self, blob: &ConfigBlob) -> Result<()> {
        check_blob_type(blob, KIND)?;
        self.store = Some(blob_string(blob, KIND, "store")?);
        Ok(())
    }

    async fn wiz_warmup(&mut self, args: &WizardArgs) -> Result<()> {
        self.wizard.begin()?;
        let mut args = args.clone();
        self.draft_store = take_arg(&mut args, &["store"]).filter(|store| {
            let known = self.backend.has_store(store);
            if !known {
                warn!(store = %store, "pre-seeded store does not exist, asking instead");
            }
            known
        });
        warn_unused_args(KIND, &args);
        Ok(())
    }

    async fn wiz_next(&mut self) -> Result<Option<FormSpec>> {
        let next = self.draft_store.is_none().then_some(Step::Store);
        Ok(self.wizard.advance(next)?.map(|step| self.form(step)))
    }

    async fn wiz_submit(&mut self, answers: &FormAnswers) -> Result<()> {
        let step = self.wizard.expecting()?;
        self.form(step).validate(answers)?;
        match step {
            Step::Store => self.draft_store = Some(text_answer(answers, "store")?),
        }
        self.wizard.answered();
        Ok(())
    }

    async fn wiz_complete(&mut self) -> Result<()> {
        if self.wizard.state() != WizardState::Complete {
            return Err(TetherError::Validation(
                "wizard has unanswered steps".into(),
            ));
        }
        let previous = std::mem::replace(&mut self.store, self.draft_store.take());
        if let Err(err) = self.warmup().await {
            self.store = previous;
            self.wiz_abort();
            return Err(err);
        }
        self.wizard.finish()
    }

    fn wiz_abort(&mut self) {
        self.draft_store = None;
        self.wizard.abort();
    }

    fn wizard_state(&self) -> WizardState {
        self.wizard.state()
    }
}
