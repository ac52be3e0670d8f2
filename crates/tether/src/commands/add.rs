// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether add vault` and `tether add secret`.

use colored::Colorize;
use tether_config::{ProjectFile, ReconcileReport, Selection, VaultBinding};
use tether_core::{
    Answer, FormField, FormOption, FormRunner, FormSpec, Result, TetherError, Validator, WizardArgs,
};
use tether_vault::resolve::{list_vault, store_binding};
use tether_vault::run_wizard;
use tether_vault::select::{keep_bound, parse_selection, select_all, selection_form};
use tracing::info;

use crate::app::App;
use crate::prompt::ask;

/// Configures a new vault through its wizard and saves the binding.
///
/// Returns the binding name.
pub async fn add_vault(
    app: &App,
    runner: &mut dyn FormRunner,
    kind: Option<&str>,
    name: Option<String>,
    args: Vec<(String, String)>,
) -> Result<String> {
    let mut project = app.project()?;
    let kind = match kind {
        Some(kind) => app.registry.get(kind)?.descriptor.kind,
        None => choose_kind(app, runner)?,
    };

    let existing: Vec<String> = project.vault_names().into_iter().map(str::to_string).collect();
    let name = match name {
        Some(name) => name,
        None => ask_vault_name(runner, kind, &existing)?,
    };
    let name = name.trim().to_string();
    // Fail before the wizard talks to the backend.
    if project.vaults().contains_key(&name) {
        return Err(TetherError::Validation(format!("vault '{name}' already exists")));
    }

    let mut vault = app.registry.create(kind)?;
    let args: WizardArgs = args.into_iter().collect();
    run_wizard(vault.as_mut(), runner, &args).await?;

    let binding = VaultBinding::from_blob(vault.marshal())?;
    project.add_vault(&name, binding)?;
    project.save()?;
    info!(vault = %name, kind, summary = %vault.describe(), "added vault");
    Ok(name)
}

fn choose_kind(app: &App, runner: &mut dyn FormRunner) -> Result<&'static str> {
    let options = app
        .registry
        .list_all()
        .into_iter()
        .map(|entry| FormOption::new(entry.descriptor.display_name, entry.descriptor.kind))
        .collect();
    let form = FormSpec::new("vault-type", "New vault")
        .field(FormField::select("type", "Vault type", options));
    let answers = ask(runner, &form)?;
    let chosen = answers
        .get("type")
        .and_then(Answer::as_text)
        .ok_or_else(|| TetherError::Validation("no vault type chosen".into()))?;
    Ok(app.registry.get(chosen)?.descriptor.kind)
}

fn ask_vault_name(runner: &mut dyn FormRunner, kind: &str, existing: &[String]) -> Result<String> {
    let mut field = FormField::input("name", "Vault name")
        .describe("Name the project file uses for this vault")
        .validator(Validator::NonEmpty)
        .validator(Validator::NotIn(existing.to_vec()));
    if !existing.iter().any(|e| e.eq_ignore_ascii_case(kind)) {
        field = field.default_answer(Answer::from(kind));
    }
    let form = FormSpec::new("vault-name", "New vault").field(field);
    let answers = ask(runner, &form)?;
    answers
        .get("name")
        .and_then(Answer::as_text)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| TetherError::Validation("no vault name given".into()))
}

/// Re-selects the secrets bound from one vault.
///
/// `all` binds every enabled remote secret without showing a form. A vault
/// with an entry form adds the entered secret to its existing bindings
/// instead.
pub async fn add_secrets(
    app: &App,
    runner: &mut dyn FormRunner,
    vault: Option<&str>,
    all: bool,
) -> Result<ReconcileReport> {
    let mut project = app.project()?;
    let vault = match vault {
        Some(name) => {
            project.vault(name)?;
            name.to_string()
        }
        None => choose_vault(&project, runner)?,
    };

    let (backend, mut listing) = list_vault(&project, &app.registry, &vault).await?;
    let selection = match backend.entry_form() {
        _ if all => select_all(&project, &vault, &listing),
        Some(form) => {
            let answers = ask(runner, &form)?;
            let entered = backend.submit_entry(&answers).await?;
            let mut selection = keep_bound(&project, &vault, &listing);
            if !selection.iter().any(|s| s.remote_key == entered.remote_key) {
                selection.push(Selection::new(&entered.remote_key));
            }
            if !listing.iter().any(|s| s.remote_key == entered.remote_key) {
                listing.push(entered);
            }
            selection
        }
        None => {
            let form = selection_form(&project, &vault, &listing);
            let answers = ask(runner, &form)?;
            parse_selection(&project, &vault, &answers)?
        }
    };

    let report = project.reconcile(&vault, &listing, &selection)?;
    let stored = store_binding(&mut project, &vault, &*backend)?;
    if stored || !report.is_unchanged() {
        project.save()?;
    }
    Ok(report)
}

fn choose_vault(project: &ProjectFile, runner: &mut dyn FormRunner) -> Result<String> {
    let names = project.vault_names();
    match names.as_slice() {
        [] => Err(TetherError::not_found(
            "vault",
            "none configured (run `tether add vault` first)",
        )),
        [only] => Ok(only.to_string()),
        _ => {
            let options = names
                .iter()
                .map(|name| FormOption::new(*name, *name))
                .collect();
            let form = FormSpec::new("choose-vault", "Bind secrets")
                .field(FormField::select("vault", "Vault", options));
            let answers = ask(runner, &form)?;
            answers
                .get("vault")
                .and_then(Answer::as_text)
                .map(str::to_string)
                .ok_or_else(|| TetherError::Validation("no vault chosen".into()))
        }
    }
}

/// Prints what a re-selection changed.
pub fn print_report(report: &ReconcileReport) {
    if report.is_unchanged() {
        eprintln!("{} bindings unchanged", "ok".green().bold());
        return;
    }
    for name in &report.added {
        eprintln!("  {} {name}", "+".green());
    }
    for name in &report.deselected {
        eprintln!("  {} {name}", "-".yellow());
    }
    for name in &report.pruned {
        eprintln!("  {} {name} {}", "-".red(), "(gone from vault)".dimmed());
    }
}
