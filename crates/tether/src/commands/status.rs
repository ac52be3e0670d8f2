// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether status` command implementation.
//!
//! Lists the vaults and secret bindings of the selected environment and
//! whether each bound secret has a local value. `--json` prints a
//! structured report for scripting; `--plain` or a non-TTY stdout disables
//! colors.

use std::collections::BTreeSet;
use std::io::IsTerminal;

use colored::Colorize;
use serde::Serialize;
use tether_config::dotenv::collect_records;
use tether_config::ProjectFile;
use tether_core::{Result, TetherError};

use crate::app::App;

/// Structured status output for `--json` mode.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub env: String,
    pub project: String,
    pub vaults: Vec<VaultStatus>,
    pub secrets: Vec<SecretStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub summary: String,
    pub secrets: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecretStatus {
    pub name: String,
    pub vault: String,
    pub remote_key: String,
    pub content_type: String,
    pub enabled: bool,
    /// A value for this key exists in one of the environment's `.env` files.
    pub local: bool,
}

/// Builds the report without touching any backend.
pub fn build_report(app: &App, project: &ProjectFile) -> Result<StatusReport> {
    let local: BTreeSet<String> = collect_records(&app.workspace, project)?
        .into_iter()
        .map(|r| r.key)
        .collect();

    let vaults = project
        .vaults()
        .iter()
        .map(|(name, binding)| VaultStatus {
            name: name.clone(),
            kind: binding.kind.clone(),
            summary: app
                .registry
                .open(binding)
                .map(|vault| vault.describe())
                .unwrap_or_else(|e| format!("unavailable: {e}")),
            secrets: project.secrets_for_vault(name).count(),
        })
        .collect();

    let secrets = project
        .secrets()
        .iter()
        .map(|(name, binding)| SecretStatus {
            name: name.clone(),
            vault: binding.vault.clone(),
            remote_key: binding.remote_key.clone(),
            content_type: binding.content_type.clone(),
            enabled: binding.enabled,
            local: local.contains(name),
        })
        .collect();

    Ok(StatusReport {
        env: project.env().to_string(),
        project: project.path().display().to_string(),
        vaults,
        secrets,
    })
}

/// Run the `tether status` command.
pub fn run_status(app: &App, json: bool, plain: bool) -> Result<()> {
    let project = app.project()?;
    let report = build_report(app, &project)?;
    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| TetherError::Serialization(format!("failed to encode status: {e}")))?;
        println!("{out}");
    } else {
        let color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_text(&report, color));
    }
    Ok(())
}

/// Human-readable report.
pub fn render_text(report: &StatusReport, color: bool) -> String {
    let paint = |text: &str, style: fn(&str) -> colored::ColoredString| {
        if color { style(text).to_string() } else { text.to_string() }
    };
    let env = if report.env.is_empty() { "(default)" } else { report.env.as_str() };

    let mut out = String::new();
    out.push_str(&format!("{} {env}\n", paint("Environment:", |s| s.bold())));
    out.push_str(&format!("{} {}\n", paint("Project:", |s| s.bold()), report.project));

    out.push_str(&format!("\n{}\n", paint("Vaults", |s| s.bold())));
    if report.vaults.is_empty() {
        out.push_str("  none\n");
    }
    for vault in &report.vaults {
        out.push_str(&format!(
            "  {:<12} {:<10} {} ({} secret(s))\n",
            vault.name, vault.kind, vault.summary, vault.secrets
        ));
    }

    out.push_str(&format!("\n{}\n", paint("Secrets", |s| s.bold())));
    if report.secrets.is_empty() {
        out.push_str("  none\n");
    }
    for secret in &report.secrets {
        let mut notes = Vec::new();
        if !secret.enabled {
            notes.push(paint("disabled", |s| s.yellow()));
        }
        if !secret.local {
            notes.push(paint("not pulled", |s| s.dimmed()));
        }
        let line = format!(
            "  {:<20} {}/{} {}",
            secret.name,
            secret.vault,
            secret.remote_key,
            notes.join(" ")
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> StatusReport {
        StatusReport {
            env: String::new(),
            project: "/repo/.tether.toml".into(),
            vaults: vec![VaultStatus {
                name: "main".into(),
                kind: "test".into(),
                summary: "store mystore".into(),
                secrets: 1,
            }],
            secrets: vec![SecretStatus {
                name: "MY_KEY".into(),
                vault: "main".into(),
                remote_key: "mykey".into(),
                content_type: "text/plain".into(),
                enabled: true,
                local: false,
            }],
        }
    }

    #[test]
    fn plain_text_has_no_escape_codes() {
        let text = render_text(&report(), false);
        assert!(!text.contains('\x1b'));
        assert!(text.contains("Environment: (default)"));
        assert!(text.contains("MY_KEY"));
        assert!(text.contains("main/mykey not pulled"));
    }

    #[test]
    fn json_uses_type_key() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["vaults"][0]["type"], "test");
        assert_eq!(json["secrets"][0]["local"], false);
    }
}
