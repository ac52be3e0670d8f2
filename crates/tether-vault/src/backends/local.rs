// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OS credential store backend (macOS Keychain, Windows Credential Manager,
//! Secret Service on Linux).
//!
//! Credential stores cannot enumerate entries portably, so the keys pushed
//! through this vault are recorded in its configuration blob.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tether_core::types::DEFAULT_CONTENT_TYPE;
use tether_core::{
    Answer, ConfigBlob, FormAnswers, FormField, FormSpec, RemoteSecret, Result, SecretContent, TetherError,
    Validator, Vault, WizardArgs, WizardMachine, WizardState,
};
use tracing::debug;

use super::{blob_string, check_blob_type};
use crate::wizard::{take_arg, text_answer, warn_unused_args};

pub const KIND: &str = "local";

const CHECK_USER: &str = "__tether_check__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Service,
}

/// Vault backed by one keyring service name.
#[derive(Debug, Default)]
pub struct LocalVault {
    service: Option<String>,
    keys: Mutex<BTreeSet<String>>,
    wizard: WizardMachine<Step>,
    draft_service: Option<String>,
}

impl LocalVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self) -> Result<String> {
        self.service
            .clone()
            .ok_or_else(|| TetherError::Validation("local vault has no service configured".into()))
    }

    fn form(step: Step) -> FormSpec {
        match step {
            Step::Service => FormSpec::new("service", "OS keyring").field(
                FormField::input("service", "Service name")
                    .describe("Entries are stored under this service in the OS credential store")
                    .validator(Validator::NonEmpty)
                    .validator(Validator::MaxLen(128)),
            ),
        }
    }

    fn entry_spec() -> FormSpec {
        FormSpec::new("new-secret", "New keyring entry")
            .describe("The keyring cannot list its entries; name the one to bind")
            .field(
                FormField::input("key", "Key")
                    .validator(Validator::NonEmpty)
                    .validator(Validator::MaxLen(256)),
            )
            .field(
                FormField::password("value", "Value")
                    .describe("Leave empty to bind an entry that already exists")
                    .default_answer(Answer::Text(String::new())),
            )
    }

    fn record_key(&self, key: &str) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
    }

    fn known_keys(&self) -> Vec<String> {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.iter().cloned().collect()
    }
}

fn keyring_error(err: keyring::Error) -> TetherError {
    TetherError::Connectivity {
        backend: KIND.to_string(),
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

/// Runs a blocking keyring call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TetherError::Internal(format!("keyring task failed: {e}")))?
}

#[async_trait]
impl Vault for LocalVault {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn display_name(&self) -> &'static str {
        "OS keyring"
    }

    fn describe(&self) -> String {
        format!("{KIND}: {}", self.service.as_deref().unwrap_or("<unset>"))
    }

    async fn warmup(&mut self) -> Result<()> {
        let service = self.service()?;
        blocking(move || {
            let entry = keyring::Entry::new(&service, CHECK_USER).map_err(keyring_error)?;
            entry.set_password("check").map_err(keyring_error)?;
            let read = entry.get_password().map_err(keyring_error)?;
            entry.delete_credential().map_err(keyring_error)?;
            if read != "check" {
                return Err(TetherError::connectivity(KIND, "keyring returned a different value"));
            }
            Ok(())
        })
        .await
    }

    async fn list(&self) -> Result<Vec<RemoteSecret>> {
        self.service()?;
        Ok(self
            .known_keys()
            .into_iter()
            .map(|k| RemoteSecret::new(k, DEFAULT_CONTENT_TYPE, true))
            .collect())
    }

    async fn pull(&self, secret: &RemoteSecret) -> Result<SecretContent> {
        let service = self.service()?;
        let key = secret.remote_key.clone();
        let value = blocking(move || {
            let entry = keyring::Entry::new(&service, &key).map_err(keyring_error)?;
            match entry.get_password() {
                Ok(value) => Ok(value),
                Err(keyring::Error::NoEntry) => Err(TetherError::not_found("secret", key)),
                Err(e) => Err(keyring_error(e)),
            }
        })
        .await?;
        Ok(SecretContent::new(&secret.remote_key, value).with_content_type(&secret.content_type))
    }

    async fn push(&self, content: &SecretContent) -> Result<()> {
        let service = self.service()?;
        let key = content.remote_key.clone();
        let value = content.expose().to_string();
        debug!(service = %service, key = %key, "storing secret in keyring");
        blocking(move || {
            keyring::Entry::new(&service, &key)
                .and_then(|entry| entry.set_password(&value))
                .map_err(keyring_error)
        })
        .await?;
        self.record_key(&content.remote_key);
        Ok(())
    }

    fn entry_form(&self) -> Option<FormSpec> {
        Some(Self::entry_spec())
    }

    async fn submit_entry(&self, answers: &FormAnswers) -> Result<RemoteSecret> {
        Self::entry_spec().validate(answers)?;
        let key = text_answer(answers, "key")?;
        let value = answers
            .get("value")
            .and_then(Answer::as_text)
            .unwrap_or_default()
            .to_string();
        let service = self.service()?;

        let (lookup_service, lookup_key) = (service.clone(), key.clone());
        let exists = blocking(move || {
            let entry = keyring::Entry::new(&lookup_service, &lookup_key).map_err(keyring_error)?;
            match entry.get_password() {
                Ok(_) => Ok(true),
                Err(keyring::Error::NoEntry) => Ok(false),
                Err(e) => Err(keyring_error(e)),
            }
        })
        .await?;

        match (exists, value.is_empty()) {
            (true, true) => self.record_key(&key),
            (true, false) => {
                return Err(TetherError::Validation(format!(
                    "key '{key}' already exists in '{service}'; leave the value empty to bind it"
                )));
            }
            (false, true) => {
                return Err(TetherError::Validation(format!(
                    "no entry '{key}' in '{service}'; enter a value to create it"
                )));
            }
            (false, false) => self.push(&SecretContent::new(&key, value)).await?,
        }
        Ok(RemoteSecret::new(key, DEFAULT_CONTENT_TYPE, true))
    }

    fn marshal(&self) -> ConfigBlob {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        if let Some(service) = &self.service {
            blob.insert("service".into(), service.as_str().into());
        }
        let keys: Vec<toml::Value> = self.known_keys().into_iter().map(toml::Value::String).collect();
        if !keys.is_empty() {
            blob.insert("keys".into(), toml::Value::Array(keys));
        }
        blob
    }

    fn unmarshal(&mut self, blob: &ConfigBlob) -> Result<()> {
        check_blob_type(blob, KIND)?;
        let service = blob_string(blob, KIND, "service")?;
        let keys: BTreeSet<String> = match blob.get("keys") {
            None => BTreeSet::new(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        TetherError::Validation("local vault 'keys' must be strings".into())
                    })
                })
                .collect::<Result<_>>()?,
            Some(_) => {
                return Err(TetherError::Validation(
                    "local vault 'keys' must be an array".into(),
                ));
            }
        };
        self.service = Some(service);
        self.keys = Mutex::new(keys);
        Ok(())
    }

    async fn wiz_warmup(&mut self, args: &WizardArgs) -> Result<()> {
        self.wizard.begin()?;
        let mut args = args.clone();
        self.draft_service = take_arg(&mut args, &["service", "s"]);
        warn_unused_args(KIND, &args);
        Ok(())
    }

    async fn wiz_next(&mut self) -> Result<Option<FormSpec>> {
        let next = self.draft_service.is_none().then_some(Step::Service);
        Ok(self.wizard.advance(next)?.map(Self::form))
    }

    async fn wiz_submit(&mut self, answers: &FormAnswers) -> Result<()> {
        let step = self.wizard.expecting()?;
        Self::form(step).validate(answers)?;
        match step {
            Step::Service => self.draft_service = Some(text_answer(answers, "service")?),
        }
        self.wizard.answered();
        Ok(())
    }

    async fn wiz_complete(&mut self) -> Result<()> {
        if self.wizard.state() != WizardState::Complete {
            return Err(TetherError::Validation("wizard has unanswered steps".into()));
        }
        let previous = std::mem::replace(&mut self.service, self.draft_service.take());
        if let Err(err) = self.warmup().await {
            self.service = previous;
            self.wiz_abort();
            return Err(err);
        }
        self.wizard.finish()
    }

    fn wiz_abort(&mut self) {
        self.draft_service = None;
        self.wizard.abort();
    }

    fn wizard_state(&self) -> WizardState {
        self.wizard.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_round_trip_keeps_keys() {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), "local".into());
        blob.insert("service".into(), "myapp".into());
        blob.insert(
            "keys".into(),
            toml::Value::Array(vec!["a".into(), "b".into()]),
        );
        let mut v = LocalVault::new();
        v.unmarshal(&blob).unwrap();
        assert_eq!(v.marshal(), blob);
        assert_eq!(v.describe(), "local: myapp");
    }

    #[test]
    fn unmarshal_requires_service() {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), "local".into());
        assert!(LocalVault::new().unmarshal(&blob).unwrap_err().is_validation());
    }

    #[test]
    fn bad_keys_are_rejected() {
        let mut blob = ConfigBlob::new();
        blob.insert("service".into(), "myapp".into());
        blob.insert("keys".into(), "a".into());
        assert!(LocalVault::new().unmarshal(&blob).is_err());
    }

    #[tokio::test]
    async fn list_returns_recorded_keys() {
        let mut blob = ConfigBlob::new();
        blob.insert("service".into(), "myapp".into());
        blob.insert("keys".into(), toml::Value::Array(vec!["b".into(), "a".into()]));
        let mut v = LocalVault::new();
        v.unmarshal(&blob).unwrap();
        let keys: Vec<_> = v.list().await.unwrap().into_iter().map(|s| s.remote_key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn short_alias_preseeds_service() {
        let mut v = LocalVault::new();
        let mut args = WizardArgs::new();
        args.insert("s".into(), "myapp".into());
        v.wiz_warmup(&args).await.unwrap();
        assert!(v.wiz_next().await.unwrap().is_none());
        assert_eq!(v.wizard_state(), WizardState::Complete);
    }

    fn mock_keyring() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    }

    fn bound_vault() -> LocalVault {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), "local".into());
        blob.insert("service".into(), "myapp".into());
        let mut v = LocalVault::new();
        v.unmarshal(&blob).unwrap();
        v
    }

    #[tokio::test]
    async fn entered_secret_is_listed_and_persisted() {
        mock_keyring();
        let v = bound_vault();
        assert_eq!(v.entry_form().unwrap().id, "new-secret");

        let mut answers = FormAnswers::new();
        answers.insert("key".into(), Answer::from("API_TOKEN"));
        answers.insert("value".into(), Answer::from("s3cret"));
        let added = v.submit_entry(&answers).await.unwrap();
        assert_eq!(added.remote_key, "API_TOKEN");
        assert!(added.enabled);

        let listed: Vec<_> = v.list().await.unwrap().into_iter().map(|s| s.remote_key).collect();
        assert_eq!(listed, vec!["API_TOKEN"]);
        assert_eq!(
            v.marshal().get("keys"),
            Some(&toml::Value::Array(vec!["API_TOKEN".into()]))
        );
    }

    #[tokio::test]
    async fn empty_value_requires_existing_entry() {
        mock_keyring();
        let v = bound_vault();
        let mut answers = FormAnswers::new();
        answers.insert("key".into(), Answer::from("MISSING"));
        let err = v.submit_entry(&answers).await.unwrap_err();
        assert!(err.is_validation());
        assert!(v.list().await.unwrap().is_empty());
    }
}
