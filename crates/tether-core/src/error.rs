// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every tether crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T, E = TetherError> = std::result::Result<T, E>;

/// The primary error type returned by vaults, registries and the project model.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Backend unreachable or unauthenticated. Aborts the current operation.
    #[error("{backend}: connectivity error: {message}")]
    Connectivity {
        backend: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed blob, duplicate binding, invalid name. Re-prompt where interactive.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing binding, vault, format or writer.
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// One discovery branch failed. Logged, never aborts the run.
    #[error("partial enumeration in {scope}: {message}")]
    PartialEnumeration { scope: String, message: String },

    /// Tool configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors with the offending path attached.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Encoding or decoding a payload failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The operation was cancelled before completing.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TetherError {
    /// Shorthand for a connectivity error without an underlying source.
    pub fn connectivity(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that should re-prompt instead of aborting.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Process exit code for the outermost CLI layer.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Connectivity { .. } => 4,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for TetherError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = TetherError::not_found("writer", "stdoot");
        assert_eq!(err.to_string(), "writer not found: stdoot");

        let err = TetherError::connectivity("keyvault", "401 Unauthorized");
        assert_eq!(
            err.to_string(),
            "keyvault: connectivity error: 401 Unauthorized"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(TetherError::Validation("x".into()).exit_code(), 2);
        assert_eq!(TetherError::not_found("vault", "x").exit_code(), 3);
        assert_eq!(TetherError::connectivity("local", "x").exit_code(), 4);
        assert_eq!(TetherError::Internal("x".into()).exit_code(), 1);
    }

    #[test]
    fn only_validation_reprompts() {
        assert!(TetherError::Validation("x".into()).is_validation());
        assert!(!TetherError::Config("x".into()).is_validation());
    }
}
