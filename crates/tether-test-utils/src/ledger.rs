// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A vault that cannot enumerate its store, like an OS keyring.
//!
//! Keys are only known once pushed or entered, and are recorded in the
//! vault's configuration blob. Values live in a [`Ledger`] shared by every
//! instance the registry builds.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tether_core::{
    Answer, ConfigBlob, FormAnswers, FormField, FormSpec, RemoteSecret, Result, SecretContent,
    TetherError, Validator, Vault, WizardArgs, WizardMachine, WizardState,
};
use tether_vault::{VaultDescriptor, VaultRegistry};

pub const KIND: &str = "ledger";

/// Values keyed by `(book, key)`.
pub type Ledger = Arc<Mutex<BTreeMap<(String, String), String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Book,
}

/// Registers the ledger backend on `registry`, sharing `ledger`.
pub fn register_ledger(registry: &mut VaultRegistry, ledger: Ledger) -> Result<()> {
    registry.register(
        VaultDescriptor {
            kind: KIND,
            display_name: "Ledger (test)",
            description: "Write-only store that records its keys",
        },
        move || -> Result<Box<dyn Vault>> { Ok(Box::new(LedgerVault::new(ledger.clone()))) },
    )
}

#[derive(Debug)]
pub struct LedgerVault {
    ledger: Ledger,
    book: Option<String>,
    keys: Mutex<BTreeSet<String>>,
    wizard: WizardMachine<Step>,
    draft_book: Option<String>,
}

impl LedgerVault {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            book: None,
            keys: Mutex::new(BTreeSet::new()),
            wizard: WizardMachine::new(),
            draft_book: None,
        }
    }

    fn book(&self) -> Result<&str> {
        self.book
            .as_deref()
            .ok_or_else(|| TetherError::Validation("ledger vault has no book".into()))
    }

    fn entry_spec() -> FormSpec {
        FormSpec::new("new-secret", "New ledger entry")
            .field(FormField::input("key", "Key").validator(Validator::NonEmpty))
            .field(FormField::password("value", "Value").validator(Validator::NonEmpty))
    }

    fn keys(&self) -> Vec<String> {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.iter().cloned().collect()
    }
}

#[async_trait]
impl Vault for LedgerVault {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn display_name(&self) -> &'static str {
        "Ledger (test)"
    }

    fn describe(&self) -> String {
        format!("{KIND}: {}", self.book.as_deref().unwrap_or("<unset>"))
    }

    async fn warmup(&mut self) -> Result<()> {
        self.book().map(|_| ())
    }

    async fn list(&self) -> Result<Vec<RemoteSecret>> {
        self.book()?;
        Ok(self
            .keys()
            .into_iter()
            .map(|k| RemoteSecret::new(k, "text/plain", true))
            .collect())
    }

    async fn pull(&self, secret: &RemoteSecret) -> Result<SecretContent> {
        let slot = (self.book()?.to_string(), secret.remote_key.clone());
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger
            .get(&slot)
            .map(|value| SecretContent::new(&secret.remote_key, value))
            .ok_or_else(|| TetherError::not_found("secret", &secret.remote_key))
    }

    async fn push(&self, content: &SecretContent) -> Result<()> {
        let slot = (self.book()?.to_string(), content.remote_key.clone());
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, content.expose().to_string());
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(content.remote_key.clone());
        Ok(())
    }

    fn entry_form(&self) -> Option<FormSpec> {
        Some(Self::entry_spec())
    }

    async fn submit_entry(&self, answers: &FormAnswers) -> Result<RemoteSecret> {
        Self::entry_spec().validate(answers)?;
        let text = |key: &str| {
            answers
                .get(key)
                .and_then(Answer::as_text)
                .map(str::to_string)
                .unwrap_or_default()
        };
        let key = text("key").trim().to_string();
        self.push(&SecretContent::new(&key, text("value"))).await?;
        Ok(RemoteSecret::new(key, "text/plain", true))
    }

    fn marshal(&self) -> ConfigBlob {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        if let Some(book) = &self.book {
            blob.insert("book".into(), book.as_str().into());
        }
        let keys: Vec<toml::Value> = self.keys().into_iter().map(toml::Value::String).collect();
        if !keys.is_empty() {
            blob.insert("keys".into(), toml::Value::Array(keys));
        }
        blob
    }

    fn unmarshal(&mut self, blob: &ConfigBlob) -> Result<()> {
        let book = blob
            .get("book")
            .and_then(|b| b.as_str())
            .ok_or_else(|| TetherError::Validation("ledger vault requires 'book'".into()))?;
        let keys: BTreeSet<String> = blob
            .get("keys")
            .and_then(|k| k.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        self.book = Some(book.to_string());
        self.keys = Mutex::new(keys);
        Ok(())
    }

    async fn wiz_warmup(&mut self, args: &WizardArgs) -> Result<()> {
        self.wizard.begin()?;
        self.draft_book = args.get("book").cloned();
        Ok(())
    }

    async fn wiz_next(&mut self) -> Result<Option<FormSpec>> {
        let next = self.draft_book.is_none().then_some(Step::Book);
        Ok(self.wizard.advance(next)?.map(|_| {
            FormSpec::new("book", "Ledger")
                .field(FormField::input("book", "Book").validator(Validator::NonEmpty))
        }))
    }

    async fn wiz_submit(&mut self, answers: &FormAnswers) -> Result<()> {
        self.wizard.expecting()?;
        let book = answers
            .get("book")
            .and_then(Answer::as_text)
            .ok_or_else(|| TetherError::Validation("missing answer for 'book'".into()))?;
        self.draft_book = Some(book.to_string());
        self.wizard.answered();
        Ok(())
    }

    async fn wiz_complete(&mut self) -> Result<()> {
        self.book = self.draft_book.take();
        self.wizard.finish()
    }

    fn wiz_abort(&mut self) {
        self.draft_book = None;
        self.wizard.abort();
    }

    fn wizard_state(&self) -> WizardState {
        self.wizard.state()
    }
}
