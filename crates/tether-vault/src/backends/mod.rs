// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in vault backends.

pub mod keyvault;
#[cfg(feature = "keyring")]
pub mod local;
pub mod memory;

use tether_core::{ConfigBlob, Result, TetherError};

/// Rejects blobs written by a different backend. A missing `type` is allowed
/// because project files store it next to the blob.
pub(crate) fn check_blob_type(blob: &ConfigBlob, kind: &str) -> Result<()> {
    match blob.get("type").and_then(|t| t.as_str()) {
        Some(found) if !found.eq_ignore_ascii_case(kind) => Err(TetherError::Validation(format!(
            "{kind} vault cannot load configuration of type '{found}'"
        ))),
        _ => Ok(()),
    }
}

/// Required, non-empty string field of a blob.
pub(crate) fn blob_string(blob: &ConfigBlob, kind: &str, key: &str) -> Result<String> {
    blob.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TetherError::Validation(format!("{kind} vault configuration is missing '{key}'")))
}

/// Optional string field of a blob.
pub(crate) fn blob_opt_string(blob: &ConfigBlob, key: &str) -> Option<String> {
    blob.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
