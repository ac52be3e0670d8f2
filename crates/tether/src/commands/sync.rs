// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether pull` and `tether push`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tether_config::dotenv::{collect_records, upsert_env_file};
use tether_core::Result;
use tether_vault::resolve::{pull_bound, push_bound};

use crate::app::App;

/// Where `pull` wrote and which keys it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pulled {
    pub path: PathBuf,
    pub keys: Vec<String>,
}

/// Fetches every enabled bound secret into the project's secret env file.
///
/// Existing lines for other keys are kept.
pub async fn pull(app: &App) -> Result<Pulled> {
    let project = app.project()?;
    let contents = pull_bound(&project, &app.registry).await?;

    let mut values = BTreeMap::new();
    for content in &contents {
        let key = content.local_key.clone().unwrap_or_else(|| content.remote_key.clone());
        app.conceal(content.expose());
        values.insert(key, content.expose().to_string());
    }

    let path = project.secret_env_path();
    if !values.is_empty() {
        upsert_env_file(&path, &values)?;
        app.workspace.cache().invalidate();
    }
    Ok(Pulled {
        path,
        keys: values.into_keys().collect(),
    })
}

/// Sends the local value of every bound secret to its vault.
///
/// Later files win when a key is defined more than once. Vault bindings
/// whose configuration changed by pushing are saved.
pub async fn push(app: &App) -> Result<Vec<String>> {
    let mut project = app.project()?;
    let mut values = BTreeMap::new();
    for record in collect_records(&app.workspace, &project)? {
        if record.is_secret {
            app.conceal(&record.value);
            values.insert(record.key, record.value);
        }
    }
    let outcome = push_bound(&mut project, &app.registry, &values).await?;
    if !outcome.updated.is_empty() {
        project.save()?;
    }
    Ok(outcome.pushed)
}
