// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of wizard forms.
//!
//! Prompts go to stderr so that stdout stays clean for `export`.
//! Ctrl-C or Ctrl-D at any prompt cancels the surrounding operation.

use std::io::IsTerminal;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tether_core::{
    Answer, FieldKind, FormAnswers, FormField, FormOption, FormRunner, FormSpec, Result,
    TetherError,
};
use tracing::debug;

/// Upper bound on re-asking a whole form whose answers were rejected.
const MAX_ATTEMPTS: usize = 5;

/// Picks the runner for this invocation. Without a terminal on stdin every
/// form is answered with its defaults.
pub fn runner_for(accept_defaults: bool) -> Box<dyn FormRunner> {
    if accept_defaults || !std::io::stdin().is_terminal() {
        debug!("answering forms with defaults");
        Box::new(DefaultsFormRunner)
    } else {
        Box::new(TerminalFormRunner)
    }
}

/// Shows `form` until its answers pass validation.
///
/// Non-interactive runners get a single try.
pub fn ask(runner: &mut dyn FormRunner, form: &FormSpec) -> Result<FormAnswers> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let answers = runner.run(form)?;
        match form.validate(&answers) {
            Ok(()) => return Ok(answers),
            Err(err) if err.is_validation() && runner.is_interactive() && attempt < MAX_ATTEMPTS => {
                runner.report_invalid(form, &err);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Answers every form with [`FormSpec::default_answers`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultsFormRunner;

impl FormRunner for DefaultsFormRunner {
    fn run(&mut self, form: &FormSpec) -> Result<FormAnswers> {
        form.default_answers()
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Line-based prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalFormRunner;

impl FormRunner for TerminalFormRunner {
    fn run(&mut self, form: &FormSpec) -> Result<FormAnswers> {
        eprintln!();
        eprintln!("{}", form.title.bold());
        if let Some(description) = &form.description {
            eprintln!("{}", description.dimmed());
        }

        let mut answers = FormAnswers::new();
        for field in &form.fields {
            let answer = ask_field(field)?;
            answers.insert(field.key.clone(), answer);
        }
        Ok(answers)
    }

    fn report_invalid(&mut self, _form: &FormSpec, error: &TetherError) {
        eprintln!("{} {error}", "x".red().bold());
    }
}

fn ask_field(field: &FormField) -> Result<Answer> {
    if let Some(description) = &field.description {
        eprintln!("  {}", description.dimmed());
    }
    let fallback = field.fallback_answer();

    loop {
        let answer = match &field.kind {
            FieldKind::Input { masked } => read_input(field, *masked, fallback.as_ref())?,
            FieldKind::Select { options } => read_select(field, options, fallback.as_ref())?,
            FieldKind::MultiSelect { options } => read_multi(field, options, fallback.as_ref())?,
            FieldKind::Confirm => read_confirm(field, fallback.as_ref())?,
        };
        let Some(answer) = answer else {
            eprintln!("{} please choose one of the listed entries", "x".red().bold());
            continue;
        };
        match field.validate(&answer) {
            Ok(()) => return Ok(answer),
            Err(err) if err.is_validation() => eprintln!("{} {err}", "x".red().bold()),
            Err(err) => return Err(err),
        }
    }
}

fn read_input(field: &FormField, masked: bool, fallback: Option<&Answer>) -> Result<Option<Answer>> {
    let default = fallback.and_then(Answer::as_text).unwrap_or_default();
    let line = if masked {
        let prompt = format!("{}: ", field.title);
        rpassword::prompt_password(prompt).map_err(|e| TetherError::io("<tty>", e))?
    } else {
        read_line(&format!("{}: ", field.title), default)?
    };
    if line.is_empty() && !default.is_empty() {
        return Ok(Some(Answer::Text(default.to_string())));
    }
    Ok(Some(Answer::Text(line)))
}

fn read_select(field: &FormField, options: &[FormOption], fallback: Option<&Answer>) -> Result<Option<Answer>> {
    let default = fallback.and_then(Answer::as_text);
    list_options(options, |o| default == Some(o.value.as_str()));
    let line = read_line(&format!("{} [1-{}]: ", field.title, options.len()), "")?;
    if line.trim().is_empty() {
        return Ok(fallback.cloned());
    }
    Ok(parse_choice(&line, options).map(Answer::Text))
}

fn read_multi(field: &FormField, options: &[FormOption], fallback: Option<&Answer>) -> Result<Option<Answer>> {
    let default = fallback.and_then(Answer::as_list).unwrap_or_default();
    list_options(options, |o| default.contains(&o.value));
    let line = read_line(&format!("{} (numbers, 'all' or 'none'): ", field.title), "")?;
    if line.trim().is_empty() {
        return Ok(fallback.cloned());
    }
    Ok(parse_choices(&line, options).map(Answer::List))
}

fn read_confirm(field: &FormField, fallback: Option<&Answer>) -> Result<Option<Answer>> {
    let default = fallback.and_then(Answer::as_bool).unwrap_or(false);
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let line = read_line(&format!("{} {hint}: ", field.title), "")?;
    Ok(parse_confirm(&line, default).map(Answer::Bool))
}

fn list_options(options: &[FormOption], marked: impl Fn(&FormOption) -> bool) {
    for (i, option) in options.iter().enumerate() {
        let mark = if marked(option) { "*".green().to_string() } else { " ".to_string() };
        eprintln!("  {mark} {:>2}) {}", i + 1, option.label);
    }
}

fn read_line(prompt: &str, initial: &str) -> Result<String> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| TetherError::Internal(format!("failed to initialize readline: {e}")))?;
    match editor.readline_with_initial(prompt, (initial, "")) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(TetherError::Cancelled),
        Err(e) => Err(TetherError::Internal(format!("failed to read input: {e}"))),
    }
}

/// Resolves a 1-based index, an option value or a label.
pub fn parse_choice(input: &str, options: &[FormOption]) -> Option<String> {
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .map(|o| o.value.clone());
    }
    options
        .iter()
        .find(|o| o.value.eq_ignore_ascii_case(input) || o.label.eq_ignore_ascii_case(input))
        .map(|o| o.value.clone())
}

/// Resolves a comma or space separated list of choices, `all` or `none`.
///
/// Duplicates collapse and the result follows option order.
pub fn parse_choices(input: &str, options: &[FormOption]) -> Option<Vec<String>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Some(options.iter().map(|o| o.value.clone()).collect());
    }
    if input.eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }
    let mut picked = Vec::new();
    for token in input.split([',', ' ']).filter(|t| !t.is_empty()) {
        picked.push(parse_choice(token, options)?);
    }
    Some(
        options
            .iter()
            .filter(|o| picked.contains(&o.value))
            .map(|o| o.value.clone())
            .collect(),
    )
}

/// `y`/`yes`/`n`/`no`, empty for the default.
pub fn parse_confirm(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Validator;

    fn options() -> Vec<FormOption> {
        vec![
            FormOption::new("Azure Key Vault", "keyvault"),
            FormOption::new("OS keyring", "local"),
            FormOption::new("In-memory test vault", "test"),
        ]
    }

    #[test]
    fn choice_by_index_value_or_label() {
        assert_eq!(parse_choice("2", &options()).as_deref(), Some("local"));
        assert_eq!(parse_choice("KEYVAULT", &options()).as_deref(), Some("keyvault"));
        assert_eq!(parse_choice("os keyring", &options()).as_deref(), Some("local"));
        assert_eq!(parse_choice("0", &options()), None);
        assert_eq!(parse_choice("4", &options()), None);
        assert_eq!(parse_choice("vault", &options()), None);
    }

    #[test]
    fn choices_follow_option_order() {
        assert_eq!(
            parse_choices("3, 1 3", &options()).unwrap(),
            vec!["keyvault".to_string(), "test".to_string()]
        );
        assert_eq!(parse_choices("all", &options()).unwrap().len(), 3);
        assert!(parse_choices("none", &options()).unwrap().is_empty());
        assert!(parse_choices("1,9", &options()).is_none());
    }

    #[test]
    fn confirm_answers() {
        assert_eq!(parse_confirm("", true), Some(true));
        assert_eq!(parse_confirm(" Yes ", false), Some(true));
        assert_eq!(parse_confirm("n", true), Some(false));
        assert_eq!(parse_confirm("maybe", true), None);
    }

    #[test]
    fn defaults_runner_uses_field_defaults() {
        let form = FormSpec::new("f", "Form")
            .field(FormField::confirm("flag", "Flag").default_answer(Answer::Bool(true)))
            .field(FormField::select("kind", "Kind", options()));
        let answers = ask(&mut DefaultsFormRunner, &form).unwrap();
        assert_eq!(answers["flag"], Answer::Bool(true));
        assert_eq!(answers["kind"], Answer::from("keyvault"));
    }

    #[test]
    fn defaults_runner_fails_on_required_text() {
        let form = FormSpec::new("f", "Form")
            .field(FormField::input("name", "Name").validator(Validator::NonEmpty));
        let err = ask(&mut DefaultsFormRunner, &form).unwrap_err();
        assert!(err.is_validation());
    }
}
