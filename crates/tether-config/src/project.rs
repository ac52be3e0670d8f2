// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project file model: options, vault bindings and secret bindings for one
//! environment.
//!
//! ```toml
//! [options]
//! uppercase_locally = true
//!
//! [vault.dev]
//! type = "keyvault"
//! tenant = "..."
//! uri = "https://dev.vault.azure.net/"
//!
//! [secret.DB_PASSWORD]
//! vault = "dev"
//! remote_key = "db-password"
//! content_type = "text/plain"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tether_core::types::DEFAULT_CONTENT_TYPE;
use tether_core::{ConfigBlob, RemoteSecret, Result, TetherError};
use tracing::{debug, info};

use crate::diagnostic::{figment_to_config_errors, ConfigError};
use crate::locate::{project_file_name, MatchMode, Workspace};
use crate::naming::{is_env_var_name, validate_env_name, ProjectOptions};

/// A named backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultBinding {
    /// Registered backend type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Backend-specific fields, everything except `type`.
    #[serde(flatten)]
    pub config: ConfigBlob,
}

impl VaultBinding {
    /// Splits a marshalled vault blob into type and fields.
    pub fn from_blob(mut blob: ConfigBlob) -> Result<Self> {
        let kind = match blob.remove("type") {
            Some(toml::Value::String(kind)) if !kind.is_empty() => kind,
            _ => {
                return Err(TetherError::Validation(
                    "vault configuration is missing its 'type'".into(),
                ));
            }
        };
        Ok(Self { kind, config: blob })
    }

    /// Full blob including `type`, as handed to `Vault::unmarshal`.
    pub fn to_blob(&self) -> ConfigBlob {
        let mut blob = self.config.clone();
        blob.insert("type".into(), toml::Value::String(self.kind.clone()));
        blob
    }
}

/// A local key bound to a remote secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretBinding {
    /// Name of the owning vault binding.
    pub vault: String,
    pub remote_key: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl SecretBinding {
    pub fn new(vault: impl Into<String>, remote_key: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            remote_key: remote_key.into(),
            content_type: default_content_type(),
            enabled: true,
        }
    }

    /// Binding for a listed remote secret.
    pub fn for_remote(vault: impl Into<String>, remote: &RemoteSecret) -> Self {
        Self {
            vault: vault.into(),
            remote_key: remote.remote_key.clone(),
            content_type: remote.content_type.clone(),
            enabled: remote.enabled,
        }
    }

    /// The descriptor handed to `Vault::pull`.
    pub fn to_remote(&self) -> RemoteSecret {
        RemoteSecret::new(&self.remote_key, &self.content_type, self.enabled)
    }
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// Read-only snapshot of secret bindings, keyed by local name.
pub type SecretView = Arc<BTreeMap<String, SecretBinding>>;

/// A remote key the user picked, with the local name to bind it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub remote_key: String,
    /// `None` derives the local name from the remote key.
    pub local_key: Option<String>,
}

impl Selection {
    pub fn new(remote_key: impl Into<String>) -> Self {
        Self {
            remote_key: remote_key.into(),
            local_key: None,
        }
    }

    pub fn named(remote_key: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            remote_key: remote_key.into(),
            local_key: Some(local_key.into()),
        }
    }
}

/// Outcome of re-selecting secrets for one vault. Lists hold local names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub retained: Vec<String>,
    /// Bound locally but gone from the remote listing.
    pub pruned: Vec<String>,
    /// Still listed remotely but no longer selected.
    pub deselected: Vec<String>,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.pruned.is_empty() && self.deselected.is_empty()
    }
}

/// In-memory project file for one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(skip)]
    path: PathBuf,
    #[serde(skip)]
    env: String,

    #[serde(default)]
    options: ProjectOptions,
    #[serde(default, rename = "vault")]
    vaults: BTreeMap<String, VaultBinding>,
    #[serde(default, rename = "secret")]
    secrets: BTreeMap<String, SecretBinding>,
}

impl ProjectFile {
    /// An unsaved project at `<root>/<env>.tether.toml`.
    pub fn new(root: &Path, env: &str, options: ProjectOptions) -> Result<Self> {
        validate_env_name(env)?;
        Ok(Self {
            path: root.join(project_file_name(env)),
            env: env.to_string(),
            options,
            vaults: BTreeMap::new(),
            secrets: BTreeMap::new(),
        })
    }

    /// Creates and saves a new project. Fails if one already exists for `env`.
    pub fn create(ws: &Workspace, env: &str, options: ProjectOptions) -> Result<Self> {
        validate_env_name(env)?;
        if let Some(existing) = find_project_path(ws, env)? {
            return Err(TetherError::Validation(format!(
                "project file for '{env}' already exists: {}",
                existing.display()
            )));
        }
        let project = Self::new(ws.root(), env, options)?;
        project.save()?;
        ws.cache().invalidate();
        info!(path = %project.path.display(), "created project file");
        Ok(project)
    }

    /// Loads the project file for `env` from anywhere under the workspace root.
    pub fn load(ws: &Workspace, env: &str) -> std::result::Result<Self, Vec<ConfigError>> {
        validate_env_name(env).map_err(|e| {
            vec![ConfigError::Validation {
                message: e.to_string(),
            }]
        })?;
        let path = find_project_path(ws, env)
            .map_err(|e| vec![ConfigError::Other(e.to_string())])?
            .ok_or_else(|| {
                vec![ConfigError::ProjectNotFound {
                    env: env.to_string(),
                    file: project_file_name(env),
                }]
            })?;
        Self::load_from_path(&path, env)
    }

    /// Loads a project file from an explicit path.
    pub fn load_from_path(path: &Path, env: &str) -> std::result::Result<Self, Vec<ConfigError>> {
        debug!(path = %path.display(), "loading project file");
        let mut project: ProjectFile = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|err| {
                let sources = std::fs::read_to_string(path)
                    .map(|content| vec![(path.display().to_string(), content)])
                    .unwrap_or_default();
                figment_to_config_errors(err, &sources)
            })?;
        project.path = path.to_path_buf();
        project.env = env.to_string();
        Ok(project)
    }

    /// Writes the project back to its path.
    pub fn save(&self) -> Result<()> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| TetherError::Serialization(format!("failed to encode project file: {e}")))?;
        std::fs::write(&self.path, body).map_err(|e| TetherError::io(&self.path, e))?;
        debug!(path = %self.path.display(), vaults = self.vaults.len(), secrets = self.secrets.len(), "saved project file");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the project file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ProjectOptions {
        &mut self.options
    }

    pub fn vaults(&self) -> &BTreeMap<String, VaultBinding> {
        &self.vaults
    }

    pub fn secrets(&self) -> &BTreeMap<String, SecretBinding> {
        &self.secrets
    }

    /// Snapshot of the secret bindings for read-only consumers.
    pub fn secret_view(&self) -> SecretView {
        Arc::new(self.secrets.clone())
    }

    /// Vault binding by name.
    pub fn vault(&self, name: &str) -> Result<&VaultBinding> {
        self.vaults
            .get(name)
            .ok_or_else(|| TetherError::not_found("vault", name))
    }

    /// Sorted vault binding names.
    pub fn vault_names(&self) -> Vec<&str> {
        self.vaults.keys().map(String::as_str).collect()
    }

    /// Adds a vault binding under a new, unique name.
    pub fn add_vault(&mut self, name: &str, binding: VaultBinding) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TetherError::Validation("vault name must not be empty".into()));
        }
        if self.vaults.contains_key(name) {
            return Err(TetherError::Validation(format!(
                "vault name already exists: {name}"
            )));
        }
        self.vaults.insert(name.to_string(), binding);
        Ok(())
    }

    /// Replaces the configuration of an existing vault binding.
    pub fn replace_vault(&mut self, name: &str, binding: VaultBinding) -> Result<()> {
        let slot = self
            .vaults
            .get_mut(name)
            .ok_or_else(|| TetherError::not_found("vault", name))?;
        *slot = binding;
        Ok(())
    }

    /// Removes a vault binding and every secret bound to it.
    ///
    /// Returns the local names of the removed secrets.
    pub fn remove_vault(&mut self, name: &str) -> Result<Vec<String>> {
        self.vaults
            .remove(name)
            .ok_or_else(|| TetherError::not_found("vault", name))?;
        let orphaned: Vec<String> = self
            .secrets
            .iter()
            .filter(|(_, s)| s.vault == name)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &orphaned {
            self.secrets.remove(key);
        }
        Ok(orphaned)
    }

    /// Normalizes a local name and checks it is usable and unused.
    pub fn validate_secret_name(&self, name: &str) -> Result<String> {
        let converted = self.options.convert(name);
        if !is_env_var_name(&converted) {
            return Err(TetherError::Validation(format!(
                "'{converted}' is not a valid environment variable name"
            )));
        }
        if self.secrets.contains_key(&converted) {
            return Err(TetherError::Validation(format!(
                "secret name already exists: {converted}"
            )));
        }
        Ok(converted)
    }

    /// Binds a local key. Returns the normalized local name.
    pub fn add_secret(&mut self, local_key: &str, binding: SecretBinding) -> Result<String> {
        self.vault(&binding.vault)?;
        if let Some((existing, _)) = self.secret_for_remote(&binding.remote_key, &binding.vault) {
            return Err(TetherError::Validation(format!(
                "'{}' in vault '{}' is already bound to {existing}",
                binding.remote_key, binding.vault
            )));
        }
        let name = self.validate_secret_name(local_key)?;
        self.secrets.insert(name.clone(), binding);
        Ok(name)
    }

    /// Unbinds a local key.
    pub fn remove_secret(&mut self, local_key: &str) -> Result<SecretBinding> {
        self.secrets
            .remove(local_key)
            .ok_or_else(|| TetherError::not_found("secret", local_key))
    }

    /// Binding for a (remote key, vault) pair, if any.
    pub fn secret_for_remote(&self, remote_key: &str, vault: &str) -> Option<(&str, &SecretBinding)> {
        self.secrets
            .iter()
            .find(|(_, s)| s.remote_key == remote_key && s.vault == vault)
            .map(|(k, s)| (k.as_str(), s))
    }

    /// Bindings owned by one vault.
    pub fn secrets_for_vault<'a>(
        &'a self,
        vault: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a SecretBinding)> + 'a {
        self.secrets.iter().filter(move |(_, s)| s.vault == vault)
    }

    /// Remote secrets from a fresh listing that are not bound yet.
    pub fn offered<'a>(&self, vault: &str, listing: &'a [RemoteSecret]) -> Vec<&'a RemoteSecret> {
        listing
            .iter()
            .filter(|r| self.secret_for_remote(&r.remote_key, vault).is_none())
            .collect()
    }

    /// Applies a re-selection for `vault` against a fresh remote listing.
    ///
    /// Every name is validated before anything changes, so a failure leaves
    /// the bindings untouched. A remote key selected more than once is bound
    /// by its first selection.
    pub fn reconcile(
        &mut self,
        vault: &str,
        listing: &[RemoteSecret],
        selected: &[Selection],
    ) -> Result<ReconcileReport> {
        self.vault(vault)?;
        let listed: BTreeMap<&str, &RemoteSecret> =
            listing.iter().map(|r| (r.remote_key.as_str(), r)).collect();
        let chosen: BTreeSet<&str> = selected.iter().map(|s| s.remote_key.as_str()).collect();

        if let Some(missing) = chosen.iter().find(|k| !listed.contains_key(**k)) {
            return Err(TetherError::not_found("remote secret", *missing));
        }

        let mut report = ReconcileReport::default();
        let mut next = self.secrets.clone();

        for (local, binding) in self.secrets_for_vault(vault) {
            match listed.get(binding.remote_key.as_str()) {
                None => {
                    next.remove(local);
                    report.pruned.push(local.clone());
                }
                Some(_) if !chosen.contains(binding.remote_key.as_str()) => {
                    next.remove(local);
                    report.deselected.push(local.clone());
                }
                Some(remote) => {
                    if let Some(b) = next.get_mut(local) {
                        b.content_type = remote.content_type.clone();
                        b.enabled = remote.enabled;
                    }
                    report.retained.push(local.clone());
                }
            }
        }

        let mut seen = BTreeSet::new();
        for selection in selected {
            if !seen.insert(selection.remote_key.as_str()) {
                continue;
            }
            if self.secret_for_remote(&selection.remote_key, vault).is_some() {
                continue;
            }
            let wanted = selection.local_key.as_deref().unwrap_or(&selection.remote_key);
            let name = self.options.convert(wanted);
            if !is_env_var_name(&name) {
                return Err(TetherError::Validation(format!(
                    "'{name}' is not a valid environment variable name"
                )));
            }
            if next.contains_key(&name) {
                return Err(TetherError::Validation(format!(
                    "secret name already exists: {name}"
                )));
            }
            let remote = listed
                .get(selection.remote_key.as_str())
                .ok_or_else(|| TetherError::not_found("remote secret", &selection.remote_key))?;
            next.insert(name.clone(), SecretBinding::for_remote(vault, remote));
            report.added.push(name);
        }

        self.secrets = next;
        info!(
            vault,
            added = report.added.len(),
            retained = report.retained.len(),
            pruned = report.pruned.len(),
            deselected = report.deselected.len(),
            "reconciled secret bindings"
        );
        Ok(report)
    }

    /// `.env` file that pulled secrets are written to.
    pub fn secret_env_path(&self) -> PathBuf {
        let base = if self.options.use_dot_secret_file_for_secrets {
            ".env.secret"
        } else {
            ".env"
        };
        let name = if self.env.is_empty() {
            base.to_string()
        } else {
            format!("{base}.{}", self.env)
        };
        self.dir().join(name)
    }
}

/// First project file for `env` under the workspace, shallowest first.
fn find_project_path(ws: &Workspace, env: &str) -> Result<Option<PathBuf>> {
    let file_name = project_file_name(env);
    let mut found = ws.search(&[file_name.as_str()], MatchMode::IExact)?;
    found.sort_by_key(|p| p.components().count());
    Ok(found.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectFile {
        let mut p = ProjectFile::new(Path::new("/tmp/x"), "dev", ProjectOptions::default()).unwrap();
        let mut cfg = ConfigBlob::new();
        cfg.insert("store".into(), "mystore".into());
        p.add_vault("dev", VaultBinding { kind: "test".into(), config: cfg }).unwrap();
        p
    }

    fn listing() -> Vec<RemoteSecret> {
        vec![
            RemoteSecret::new("mykey", "text/plain", true),
            RemoteSecret::new("hiddenkey", "text/plain", false),
            RemoteSecret::new("db-password", "text/plain", true),
        ]
    }

    #[test]
    fn blob_round_trip_keeps_type() {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), "keyvault".into());
        blob.insert("uri".into(), "https://x.vault.azure.net/".into());
        let binding = VaultBinding::from_blob(blob.clone()).unwrap();
        assert_eq!(binding.kind, "keyvault");
        assert!(!binding.config.contains_key("type"));
        assert_eq!(binding.to_blob(), blob);
    }

    #[test]
    fn blob_without_type_is_rejected() {
        assert!(VaultBinding::from_blob(ConfigBlob::new()).unwrap_err().is_validation());
    }

    #[test]
    fn duplicate_vault_names_are_rejected() {
        let mut p = project();
        let err = p
            .add_vault("dev", VaultBinding { kind: "test".into(), config: ConfigBlob::new() })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn add_secret_normalizes_name() {
        let mut p = project();
        let name = p.add_secret("my-key", SecretBinding::new("dev", "mykey")).unwrap();
        assert_eq!(name, "MY_KEY");
        assert_eq!(p.secret_for_remote("mykey", "dev").map(|(k, _)| k), Some("MY_KEY"));
    }

    #[test]
    fn add_secret_rejects_duplicates() {
        let mut p = project();
        p.add_secret("MY_KEY", SecretBinding::new("dev", "mykey")).unwrap();
        // Same local name after conversion.
        let err = p.add_secret("my-key", SecretBinding::new("dev", "other")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        // Same (remote, vault) pair.
        let err = p.add_secret("OTHER", SecretBinding::new("dev", "mykey")).unwrap_err();
        assert!(err.to_string().contains("already bound"));
    }

    #[test]
    fn add_secret_requires_known_vault() {
        let mut p = project();
        let err = p.add_secret("X", SecretBinding::new("nope", "x")).unwrap_err();
        assert!(matches!(err, TetherError::NotFound { .. }));
    }

    #[test]
    fn invalid_local_names_are_rejected() {
        let p = project();
        assert!(p.validate_secret_name("1abc").is_err());
        assert!(p.validate_secret_name("has space").is_err());
    }

    #[test]
    fn removing_vault_removes_its_secrets() {
        let mut p = project();
        p.add_secret("MY_KEY", SecretBinding::new("dev", "mykey")).unwrap();
        let removed = p.remove_vault("dev").unwrap();
        assert_eq!(removed, vec!["MY_KEY"]);
        assert!(p.secrets().is_empty());
    }

    #[test]
    fn reconcile_adds_retains_prunes_and_deselects() {
        let mut p = project();
        p.add_secret("MY_KEY", SecretBinding::new("dev", "mykey")).unwrap();
        p.add_secret("GONE", SecretBinding::new("dev", "deleted-remotely")).unwrap();
        p.add_secret("DB_PASSWORD", SecretBinding::new("dev", "db-password")).unwrap();

        let report = p
            .reconcile("dev", &listing(), &[Selection::new("mykey"), Selection::new("hiddenkey")])
            .unwrap();

        assert_eq!(report.added, vec!["HIDDENKEY"]);
        assert_eq!(report.retained, vec!["MY_KEY"]);
        assert_eq!(report.pruned, vec!["GONE"]);
        assert_eq!(report.deselected, vec!["DB_PASSWORD"]);
        assert!(!p.secrets()["HIDDENKEY"].enabled);
        assert_eq!(p.secrets().len(), 2);
    }

    #[test]
    fn reconcile_failure_leaves_bindings_untouched() {
        let mut p = project();
        p.add_secret("MY_KEY", SecretBinding::new("dev", "mykey")).unwrap();
        let before = p.secrets().clone();
        let err = p
            .reconcile(
                "dev",
                &listing(),
                &[Selection::new("mykey"), Selection::named("db-password", "MY_KEY")],
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(p.secrets(), &before);
    }

    #[test]
    fn repeated_selection_binds_once() {
        let mut p = project();
        let report = p
            .reconcile(
                "dev",
                &listing(),
                &[
                    Selection::named("db-password", "DB"),
                    Selection::new("db-password"),
                    Selection::named("db-password", "DATABASE"),
                ],
            )
            .unwrap();
        assert_eq!(report.added, vec!["DB"]);
        assert_eq!(p.secrets().len(), 1);
        assert_eq!(p.secrets()["DB"].remote_key, "db-password");
    }

    #[test]
    fn reconcile_rejects_unlisted_selection() {
        let mut p = project();
        let err = p.reconcile("dev", &listing(), &[Selection::new("nope")]).unwrap_err();
        assert!(matches!(err, TetherError::NotFound { .. }));
    }

    #[test]
    fn offered_excludes_bound() {
        let mut p = project();
        p.add_secret("MY_KEY", SecretBinding::new("dev", "mykey")).unwrap();
        let list = listing();
        let offered: Vec<_> = p.offered("dev", &list).iter().map(|r| r.remote_key.as_str()).collect();
        assert_eq!(offered, vec!["hiddenkey", "db-password"]);
    }

    #[test]
    fn secret_env_path_follows_options() {
        let mut p = project();
        assert_eq!(p.secret_env_path(), Path::new("/tmp/x/.env.secret.dev"));
        p.options_mut().use_dot_secret_file_for_secrets = false;
        assert_eq!(p.secret_env_path(), Path::new("/tmp/x/.env.dev"));
    }

    #[test]
    fn reserved_env_names_are_rejected() {
        assert!(ProjectFile::new(Path::new("/tmp"), ".git", ProjectOptions::default()).is_err());
    }
}
