// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic driver for the vault wizard protocol.
//!
//! The driver knows nothing about backends: it warms the wizard up, shows
//! every form the vault asks for, and finalizes. Rejected answers are asked
//! again when the runner is interactive. Any other failure aborts the
//! wizard so no partial configuration survives.

use tether_core::{FormAnswers, FormRunner, FormSpec, Result, TetherError, Vault, WizardArgs};
use tracing::{debug, info, warn};

/// Upper bound on re-prompts for a single form.
const MAX_ATTEMPTS: usize = 5;

/// Runs the full wizard against `vault`, rendering forms through `runner`.
pub async fn run_wizard(
    vault: &mut dyn Vault,
    runner: &mut dyn FormRunner,
    args: &WizardArgs,
) -> Result<()> {
    info!(kind = vault.kind(), "starting vault wizard");
    let outcome = drive(vault, runner, args).await;
    if let Err(err) = &outcome {
        warn!(kind = vault.kind(), error = %err, "vault wizard aborted");
        vault.wiz_abort();
    }
    outcome
}

async fn drive(vault: &mut dyn Vault, runner: &mut dyn FormRunner, args: &WizardArgs) -> Result<()> {
    vault.wiz_warmup(args).await?;

    let mut attempts = 0;
    let mut last_form: Option<String> = None;
    while let Some(form) = vault.wiz_next().await? {
        if last_form.as_deref() == Some(form.id.as_str()) {
            attempts += 1;
        } else {
            attempts = 1;
            last_form = Some(form.id.clone());
        }
        if attempts > MAX_ATTEMPTS {
            return Err(TetherError::Validation(format!(
                "too many invalid answers for '{}'",
                form.title
            )));
        }

        debug!(form = %form.id, attempt = attempts, "showing wizard form");
        let answers = runner.run(&form)?;
        match submit(vault, &form, &answers).await {
            Ok(()) => {}
            Err(err) if err.is_validation() && runner.is_interactive() => {
                runner.report_invalid(&form, &err);
            }
            Err(err) => return Err(err),
        }
    }

    vault.wiz_complete().await?;
    info!(vault = %vault.describe(), "vault configured");
    Ok(())
}

async fn submit(vault: &mut dyn Vault, form: &FormSpec, answers: &FormAnswers) -> Result<()> {
    form.validate(answers)?;
    vault.wiz_submit(answers).await
}

/// First non-empty value among `keys`, removed from `args`.
///
/// Backends accept short aliases, e.g. `service` and `s`.
pub fn take_arg(args: &mut WizardArgs, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        if let Some(value) = args.remove(*key)
            && found.is_none()
            && !value.trim().is_empty()
        {
            found = Some(value.trim().to_string());
        }
    }
    found
}

/// Logs every pre-seed argument no step consumed.
pub fn warn_unused_args(kind: &str, args: &WizardArgs) {
    for key in args.keys() {
        warn!(kind, arg = %key, "ignoring unknown wizard argument");
    }
}

/// Text answer for `key`, trimmed.
pub fn text_answer(answers: &FormAnswers, key: &str) -> Result<String> {
    answers
        .get(key)
        .and_then(|a| a.as_text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TetherError::Validation(format!("missing answer for '{key}'")))
}

/// List answer for `key`. A single text answer counts as a one-item list.
pub fn list_answer(answers: &FormAnswers, key: &str) -> Result<Vec<String>> {
    match answers.get(key) {
        Some(answer) => {
            if let Some(list) = answer.as_list() {
                Ok(list.to_vec())
            } else if let Some(text) = answer.as_text() {
                Ok(vec![text.to_string()])
            } else {
                Err(TetherError::Validation(format!("answer for '{key}' must be a list")))
            }
        }
        None => Err(TetherError::Validation(format!("missing answer for '{key}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Answer;

    #[test]
    fn take_arg_prefers_first_alias_and_consumes_all() {
        let mut args = WizardArgs::new();
        args.insert("service".into(), "svc".into());
        args.insert("s".into(), "other".into());
        args.insert("extra".into(), "x".into());
        assert_eq!(take_arg(&mut args, &["service", "s"]).as_deref(), Some("svc"));
        assert_eq!(args.len(), 1);
        assert!(args.contains_key("extra"));
    }

    #[test]
    fn blank_args_are_ignored() {
        let mut args = WizardArgs::new();
        args.insert("store".into(), "  ".into());
        assert_eq!(take_arg(&mut args, &["store"]), None);
    }

    #[test]
    fn answers_are_read_by_shape() {
        let mut answers = FormAnswers::new();
        answers.insert("one".into(), Answer::from("x"));
        answers.insert("many".into(), Answer::from(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(text_answer(&answers, "one").unwrap(), "x");
        assert!(text_answer(&answers, "many").is_err());
        assert_eq!(list_answer(&answers, "one").unwrap(), vec!["x"]);
        assert_eq!(list_answer(&answers, "many").unwrap().len(), 2);
        assert!(list_answer(&answers, "none").is_err());
    }
}
