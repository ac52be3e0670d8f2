// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub Actions environment and output files.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tether_core::{Result, TetherError};
use tracing::info;

use crate::writer::Writer;

/// Which runner file a [`GithubWriter`] appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubTarget {
    /// `$GITHUB_ENV`: variables for later steps.
    Env,
    /// `$GITHUB_OUTPUT`: step outputs.
    Output,
}

impl GithubTarget {
    /// Environment variable naming the file.
    pub fn variable(self) -> &'static str {
        match self {
            Self::Env => "GITHUB_ENV",
            Self::Output => "GITHUB_OUTPUT",
        }
    }

    /// Registry name of the writer.
    pub fn writer_name(self) -> &'static str {
        match self {
            Self::Env => "github-env",
            Self::Output => "github-out",
        }
    }
}

/// Appends payloads, followed by a newline, to a runner file.
#[derive(Debug, Clone)]
pub struct GithubWriter {
    target: GithubTarget,
    path: PathBuf,
}

impl GithubWriter {
    /// Resolves the file from the runner environment.
    pub fn from_env(target: GithubTarget) -> Result<Self> {
        match std::env::var_os(target.variable()) {
            Some(path) if !path.is_empty() => Ok(Self::with_path(target, path)),
            _ => Err(TetherError::not_found(
                "environment variable",
                format!("{} (is this running in a GitHub Actions job?)", target.variable()),
            )),
        }
    }

    pub fn with_path(target: GithubTarget, path: impl Into<PathBuf>) -> Self {
        Self {
            target,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Writer for GithubWriter {
    fn name(&self) -> &str {
        self.target.writer_name()
    }

    fn write(&mut self, payload: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TetherError::io(&self.path, e))?;
        file.write_all(payload)
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|e| TetherError::io(&self.path, e))?;
        info!(path = %self.path.display(), "wrote to {}", self.target.variable());
        Ok(())
    }
}
