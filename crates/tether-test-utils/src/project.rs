// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary project directories for end-to-end tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tether_config::locate::Workspace;
use tether_config::{ProjectFile, ProjectOptions, SecretBinding, TetherConfig, VaultBinding};
use tether_core::{ConfigBlob, Result, TetherError};
use tether_vault::VaultRegistry;
use tether_vault::backends::memory::MemoryBackend;

/// A project in a temporary directory with a seeded in-memory backend.
///
/// The directory is removed when the value is dropped.
pub struct TestProject {
    dir: TempDir,
    backend: Arc<MemoryBackend>,
    registry: VaultRegistry,
}

impl TestProject {
    /// Empty directory marked as a git root, with a registry of every
    /// built-in backend sharing one seeded memory backend.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().map_err(|e| TetherError::io(std::env::temp_dir(), e))?;
        let git = dir.path().join(".git");
        std::fs::create_dir(&git).map_err(|e| TetherError::io(&git, e))?;
        let backend = Arc::new(MemoryBackend::seeded());
        let registry =
            tether_vault::builtin_registry_with(&TetherConfig::default(), backend.clone())?;
        Ok(Self {
            dir,
            backend,
            registry,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.dir.path())
    }

    pub fn backend(&self) -> &Arc<MemoryBackend> {
        &self.backend
    }

    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    /// Creates and saves a project for `env` with default options.
    pub fn create(&self, env: &str) -> Result<ProjectFile> {
        ProjectFile::create(&self.workspace(), env, ProjectOptions::default())
    }

    /// Creates a project with vault `main` on `mystore` and `mykey` bound
    /// as `MY_KEY`.
    pub fn with_bound_secret(&self, env: &str) -> Result<ProjectFile> {
        let mut project = self.create(env)?;
        let mut config = ConfigBlob::new();
        config.insert("store".into(), "mystore".into());
        project.add_vault(
            "main",
            VaultBinding {
                kind: "test".into(),
                config,
            },
        )?;
        project.add_secret("MY_KEY", SecretBinding::new("main", "mykey"))?;
        project.save()?;
        Ok(project)
    }

    /// Writes `contents` to `name` under the project root.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TetherError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| TetherError::io(&path, e))?;
        Ok(path)
    }

    pub fn read_file(&self, name: &str) -> Result<String> {
        let path = self.dir.path().join(name);
        std::fs::read_to_string(&path).map_err(|e| TetherError::io(&path, e))
    }
}
