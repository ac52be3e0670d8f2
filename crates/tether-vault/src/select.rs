// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Choosing which remote secrets of a vault are bound locally.
//!
//! The form lists every remote secret, bound ones preselected, disabled
//! ones marked with `!`. The answer is turned into [`Selection`]s that
//! [`ProjectFile::reconcile`] applies.

use tether_config::{ProjectFile, Selection};
use tether_core::{Answer, FormAnswers, FormField, FormOption, FormSpec, RemoteSecret, Result};

use crate::wizard::list_answer;

const FIELD: &str = "secrets";

/// Label for one remote secret in selection lists.
pub fn option_label(secret: &RemoteSecret) -> String {
    if secret.enabled {
        secret.to_string()
    } else {
        format!("!{secret}")
    }
}

/// Multi-select over `listing` for the vault bound as `vault`.
pub fn selection_form(project: &ProjectFile, vault: &str, listing: &[RemoteSecret]) -> FormSpec {
    let options = listing
        .iter()
        .map(|secret| {
            let bound = project.secret_for_remote(&secret.remote_key, vault).is_some();
            FormOption::new(option_label(secret), &secret.remote_key).selected(bound)
        })
        .collect::<Vec<_>>();
    let preselected: Vec<String> = options
        .iter()
        .filter(|o| o.selected)
        .map(|o| o.value.clone())
        .collect();
    let offered = project.offered(vault, listing).len();

    FormSpec::new("select-secrets", format!("Secrets in '{vault}'"))
        .describe(format!("{offered} secret(s) not bound yet"))
        .field(
            FormField::multi_select(FIELD, "Secrets to bind", options)
                .describe("Unselecting a bound secret removes its local binding")
                .default_answer(Answer::List(preselected)),
        )
}

/// Reads the selection answer back, keeping the local name of every
/// secret already bound.
pub fn parse_selection(
    project: &ProjectFile,
    vault: &str,
    answers: &FormAnswers,
) -> Result<Vec<Selection>> {
    let chosen = match answers.get(FIELD) {
        Some(_) => list_answer(answers, FIELD)?,
        None => Vec::new(),
    };
    Ok(chosen
        .into_iter()
        .map(|remote| match project.secret_for_remote(&remote, vault) {
            Some((local, _)) => Selection::named(&remote, local),
            None => Selection::new(remote),
        })
        .collect())
}

/// Every secret of `listing` already bound, under its current local name.
pub fn keep_bound(project: &ProjectFile, vault: &str, listing: &[RemoteSecret]) -> Vec<Selection> {
    listing
        .iter()
        .filter_map(|secret| {
            project
                .secret_for_remote(&secret.remote_key, vault)
                .map(|(local, _)| Selection::named(&secret.remote_key, local))
        })
        .collect()
}

/// Non-interactive `--all`: every enabled secret plus whatever is already
/// bound.
pub fn select_all(project: &ProjectFile, vault: &str, listing: &[RemoteSecret]) -> Vec<Selection> {
    listing
        .iter()
        .filter_map(|secret| match project.secret_for_remote(&secret.remote_key, vault) {
            Some((local, _)) => Some(Selection::named(&secret.remote_key, local)),
            None if secret.enabled => Some(Selection::new(&secret.remote_key)),
            None => None,
        })
        .collect()
}
