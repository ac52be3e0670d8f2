// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault capability trait.

use async_trait::async_trait;

use crate::error::{Result, TetherError};
use crate::form::{FormAnswers, FormSpec};
use crate::types::{ConfigBlob, RemoteSecret, SecretContent, WizardArgs};
use crate::wizard::WizardState;

/// A pluggable secret backend.
///
/// One instance is bound to one persisted configuration. Instances are
/// driven from a single orchestrator task: none of the `&mut self`
/// operations may be called concurrently.
///
/// Configuration happens through the wizard sub-protocol:
///
/// ```text
/// wiz_warmup(args)
/// while let Some(form) = wiz_next()? {
///     answers = render(form)
///     wiz_submit(answers)?        // Validation error => re-prompt
/// }
/// wiz_complete()
/// ```
#[async_trait]
pub trait Vault: Send + Sync {
    /// Registry type tag, written as `type` in the persisted blob.
    fn kind(&self) -> &'static str;

    /// Static human label.
    fn display_name(&self) -> &'static str;

    /// One-line summary of the bound configuration.
    fn describe(&self) -> String;

    /// Establishes and validates connectivity. Idempotent.
    async fn warmup(&mut self) -> Result<()>;

    /// Privilege escalation before `list`. Memoized by implementations.
    async fn list_elevate(&self) -> Result<()> {
        Ok(())
    }

    /// Privilege escalation before `push`. Memoized by implementations.
    async fn push_elevate(&self) -> Result<()> {
        Ok(())
    }

    /// Privilege escalation before `pull`. Memoized by implementations.
    async fn pull_elevate(&self) -> Result<()> {
        Ok(())
    }

    /// Enumerates remote secrets. Order is stable within a call.
    async fn list(&self) -> Result<Vec<RemoteSecret>>;

    /// Reads one secret value.
    async fn pull(&self, secret: &RemoteSecret) -> Result<SecretContent>;

    /// Writes one secret value.
    async fn push(&self, content: &SecretContent) -> Result<()>;

    /// Form for entering a new secret directly.
    ///
    /// Backends that cannot enumerate their store return one. Secret
    /// selection then shows it instead of a list of remote secrets.
    fn entry_form(&self) -> Option<FormSpec> {
        None
    }

    /// Stores the secret described by answers to [`Vault::entry_form`] and
    /// returns it as `list` will report it from now on.
    async fn submit_entry(&self, _answers: &FormAnswers) -> Result<RemoteSecret> {
        Err(TetherError::Internal(format!(
            "vault type '{}' has no entry form",
            self.kind()
        )))
    }

    /// Persisted configuration, including the `type` discriminator.
    fn marshal(&self) -> ConfigBlob;

    /// Restores configuration. Blobs missing the backend's keys are rejected.
    fn unmarshal(&mut self, blob: &ConfigBlob) -> Result<()>;

    /// Cold -> Collecting. Pre-seeds answers from `args`.
    async fn wiz_warmup(&mut self, args: &WizardArgs) -> Result<()>;

    /// Next form to show, or `None` once every step is satisfied.
    ///
    /// Calling again without submitting returns the same form; calling after
    /// `None` returns `None`.
    async fn wiz_next(&mut self) -> Result<Option<FormSpec>>;

    /// Applies the answers for the form last returned by `wiz_next`.
    async fn wiz_submit(&mut self, answers: &FormAnswers) -> Result<()>;

    /// Complete -> Ready. Applies the collected answers and runs `warmup`.
    async fn wiz_complete(&mut self) -> Result<()>;

    /// Discards collected answers and returns to Cold.
    fn wiz_abort(&mut self);

    fn wizard_state(&self) -> WizardState;
}
