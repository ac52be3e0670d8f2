// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether remove vault|secret`.

use tether_config::SecretBinding;
use tether_core::Result;
use tracing::info;

use crate::app::App;

/// Drops a vault binding together with every secret bound through it.
/// Returns the local names of the dropped secrets.
pub fn remove_vault(app: &App, name: &str) -> Result<Vec<String>> {
    let mut project = app.project()?;
    let dropped = project.remove_vault(name)?;
    project.save()?;
    info!(vault = name, secrets = dropped.len(), "removed vault");
    Ok(dropped)
}

pub fn remove_secret(app: &App, name: &str) -> Result<SecretBinding> {
    let mut project = app.project()?;
    let binding = project.remove_secret(name)?;
    project.save()?;
    info!(secret = name, vault = %binding.vault, "removed secret binding");
    Ok(binding)
}
