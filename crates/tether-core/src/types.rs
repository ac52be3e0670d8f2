// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between vaults, the project model and formatters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Backend-specific persisted configuration. Always carries a `type` key
/// once written to a project file.
pub type ConfigBlob = toml::Table;

/// Answers pre-seeded into a vault wizard, usually from `--arg key=value`.
pub type WizardArgs = BTreeMap<String, String>;

/// Content type used when a backend does not report one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// A secret as listed by a vault, without its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSecret {
    /// Name of the secret in the backend.
    pub remote_key: String,
    /// Content type declared by the backend.
    pub content_type: String,
    /// Disabled secrets are listed but cannot be pulled.
    pub enabled: bool,
}

impl RemoteSecret {
    pub fn new(remote_key: impl Into<String>, content_type: impl Into<String>, enabled: bool) -> Self {
        Self {
            remote_key: remote_key.into(),
            content_type: content_type.into(),
            enabled,
        }
    }
}

impl fmt::Display for RemoteSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.remote_key, self.content_type)
    }
}

/// A resolved secret value on its way to or from a vault.
#[derive(Clone)]
pub struct SecretContent {
    pub remote_key: String,
    /// Local key the value is bound to, if known.
    pub local_key: Option<String>,
    pub content_type: String,
    pub value: SecretString,
}

impl SecretContent {
    pub fn new(remote_key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            remote_key: remote_key.into(),
            local_key: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            value: SecretString::from(value.into()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_local_key(mut self, local_key: impl Into<String>) -> Self {
        self.local_key = Some(local_key.into());
        self
    }

    /// Exposes the plaintext value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

impl fmt::Debug for SecretContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretContent")
            .field("remote_key", &self.remote_key)
            .field("local_key", &self.local_key)
            .field("content_type", &self.content_type)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecretContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.remote_key, self.content_type)
    }
}

/// One resolved key/value pair handed to formatters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvRecord {
    pub key: String,
    pub value: String,
    /// File the value was read from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Set when the key is bound to a remote secret.
    #[serde(default)]
    pub is_secret: bool,
}

impl EnvRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            file: None,
            is_secret: false,
        }
    }

    pub fn secret(mut self, is_secret: bool) -> Self {
        self.is_secret = is_secret;
        self
    }

    pub fn from_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Debug for EnvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_secret { "[REDACTED]" } else { self.value.as_str() };
        f.debug_struct("EnvRecord")
            .field("key", &self.key)
            .field("value", &value)
            .field("file", &self.file)
            .field("is_secret", &self.is_secret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_secret_display() {
        let s = RemoteSecret::new("db-password", "text/plain", true);
        assert_eq!(s.to_string(), "db-password (text/plain)");
    }

    #[test]
    fn secret_content_debug_hides_value() {
        let c = SecretContent::new("mykey", "hunter2");
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("[REDACTED]"));
        assert_eq!(c.expose(), "hunter2");
    }

    #[test]
    fn env_record_debug_hides_secret_values_only() {
        let plain = EnvRecord::new("PORT", "8080");
        assert!(format!("{plain:?}").contains("8080"));

        let secret = EnvRecord::new("TOKEN", "abc").secret(true);
        assert!(!format!("{secret:?}").contains("abc"));
    }

    #[test]
    fn env_record_serializes_without_empty_file() {
        let json = serde_json::to_string(&EnvRecord::new("A", "1")).unwrap();
        assert_eq!(json, r#"{"key":"A","value":"1","is_secret":false}"#);
    }
}
