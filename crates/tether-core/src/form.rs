// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative form model.
//!
//! Vault wizards describe what they need as a [`FormSpec`]; a
//! [`FormRunner`](crate::traits::FormRunner) renders it and returns
//! [`FormAnswers`]. Nothing here knows how a form is drawn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

/// A group of fields presented together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
    /// Stable identifier of the wizard step this form belongs to.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Checks every answer against its field's kind and validators.
    ///
    /// Missing answers for optional fields fall back to the field default.
    pub fn validate(&self, answers: &FormAnswers) -> Result<()> {
        for field in &self.fields {
            match answers.get(&field.key) {
                Some(answer) => field.validate(answer)?,
                None if field.kind.requires_answer() && field.default.is_none() => {
                    return Err(TetherError::Validation(format!(
                        "'{}' requires an answer",
                        field.title
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Answers a non-interactive run would give: explicit defaults, else the
    /// preselected or first option. Fails on a text field without a default.
    pub fn default_answers(&self) -> Result<FormAnswers> {
        let mut answers = FormAnswers::new();
        for field in &self.fields {
            let answer = field.fallback_answer().ok_or_else(|| {
                TetherError::Validation(format!("'{}' has no default answer", field.title))
            })?;
            answers.insert(field.key.clone(), answer);
        }
        Ok(answers)
    }
}

/// A single prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Answer key the vault reads back.
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: FieldKind,
    #[serde(default)]
    pub default: Option<Answer>,
    #[serde(default)]
    pub validators: Vec<Validator>,
}

impl FormField {
    fn new(key: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: None,
            kind,
            default: None,
            validators: Vec::new(),
        }
    }

    /// Free text input.
    pub fn input(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(key, title, FieldKind::Input { masked: false })
    }

    /// Masked text input for secret values.
    pub fn password(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(key, title, FieldKind::Input { masked: true })
    }

    /// Single choice among `options`.
    pub fn select(key: impl Into<String>, title: impl Into<String>, options: Vec<FormOption>) -> Self {
        Self::new(key, title, FieldKind::Select { options })
    }

    /// Any number of choices among `options`. Preselected options are the default.
    pub fn multi_select(
        key: impl Into<String>,
        title: impl Into<String>,
        options: Vec<FormOption>,
    ) -> Self {
        Self::new(key, title, FieldKind::MultiSelect { options })
    }

    /// Yes/no question.
    pub fn confirm(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(key, title, FieldKind::Confirm)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_answer(mut self, answer: Answer) -> Self {
        self.default = Some(answer);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Default answer, or the one implied by the field kind.
    pub fn fallback_answer(&self) -> Option<Answer> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match &self.kind {
            FieldKind::Input { .. } => None,
            FieldKind::Select { options } => options
                .iter()
                .find(|o| o.selected)
                .or_else(|| options.first())
                .map(|o| Answer::Text(o.value.clone())),
            FieldKind::MultiSelect { options } => Some(Answer::List(
                options
                    .iter()
                    .filter(|o| o.selected)
                    .map(|o| o.value.clone())
                    .collect(),
            )),
            FieldKind::Confirm => Some(Answer::Bool(false)),
        }
    }

    /// Checks one answer against this field.
    pub fn validate(&self, answer: &Answer) -> Result<()> {
        match (&self.kind, answer) {
            (FieldKind::Input { .. }, Answer::Text(_)) | (FieldKind::Confirm, Answer::Bool(_)) => {}
            (FieldKind::Select { options }, Answer::Text(value)) => {
                if !options.iter().any(|o| &o.value == value) {
                    return Err(TetherError::Validation(format!(
                        "'{value}' is not an option for '{}'",
                        self.title
                    )));
                }
            }
            (FieldKind::MultiSelect { options }, Answer::List(values)) => {
                if let Some(bad) = values.iter().find(|v| !options.iter().any(|o| &o.value == *v)) {
                    return Err(TetherError::Validation(format!(
                        "'{bad}' is not an option for '{}'",
                        self.title
                    )));
                }
            }
            _ => {
                return Err(TetherError::Validation(format!(
                    "answer for '{}' has the wrong shape",
                    self.title
                )));
            }
        }
        if let Answer::Text(text) = answer {
            for validator in &self.validators {
                validator.check(text)?;
            }
        }
        Ok(())
    }
}

/// How a field is rendered and which [`Answer`] shape it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Input { masked: bool },
    Select { options: Vec<FormOption> },
    MultiSelect { options: Vec<FormOption> },
    Confirm,
}

impl FieldKind {
    fn requires_answer(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Select { .. })
    }
}

/// One choice in a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

impl FormOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Declarative text validators a runner can apply before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "snake_case")]
pub enum Validator {
    NonEmpty,
    MaxLen(usize),
    /// Rejects values equal (case-insensitive) to any listed entry.
    NotIn(Vec<String>),
    /// Value must start with the given prefix.
    Prefix(String),
}

impl Validator {
    pub fn check(&self, value: &str) -> Result<()> {
        let ok = match self {
            Self::NonEmpty => !value.trim().is_empty(),
            Self::MaxLen(max) => value.chars().count() <= *max,
            Self::NotIn(taken) => !taken.iter().any(|t| t.eq_ignore_ascii_case(value)),
            Self::Prefix(prefix) => value.starts_with(prefix.as_str()),
        };
        if ok {
            return Ok(());
        }
        let reason = match self {
            Self::NonEmpty => "must not be empty".to_string(),
            Self::MaxLen(max) => format!("must be at most {max} characters"),
            Self::NotIn(_) => format!("'{value}' is already taken"),
            Self::Prefix(prefix) => format!("must start with '{prefix}'"),
        };
        Err(TetherError::Validation(reason))
    }
}

/// A single answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Bool(bool),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Answer {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for Answer {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// Answers keyed by [`FormField::key`].
pub type FormAnswers = BTreeMap<String, Answer>;
