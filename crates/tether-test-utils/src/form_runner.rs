// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form runner that replays pre-recorded answers.

use std::collections::VecDeque;

use tether_core::{Answer, FormAnswers, FormRunner, FormSpec, Result, TetherError};

/// Answers forms from a FIFO queue and records every form shown.
///
/// When the queue is empty the runner either falls back to each form's
/// default answers or fails with `Cancelled`, depending on
/// [`ScriptedFormRunner::accept_defaults`].
#[derive(Debug, Default)]
pub struct ScriptedFormRunner {
    script: VecDeque<FormAnswers>,
    shown: Vec<FormSpec>,
    rejected: Vec<String>,
    accept_defaults: bool,
    non_interactive: bool,
}

impl ScriptedFormRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that answers every form with its defaults.
    pub fn defaults() -> Self {
        Self::new().accept_defaults()
    }

    pub fn accept_defaults(mut self) -> Self {
        self.accept_defaults = true;
        self
    }

    /// Rejected answers abort instead of re-prompting.
    pub fn non_interactive(mut self) -> Self {
        self.non_interactive = true;
        self
    }

    /// Queues a full answer set for the next form.
    pub fn then(mut self, answers: FormAnswers) -> Self {
        self.script.push_back(answers);
        self
    }

    /// Queues a single-field answer for the next form.
    pub fn answer(self, key: &str, answer: impl Into<Answer>) -> Self {
        let mut answers = FormAnswers::new();
        answers.insert(key.to_string(), answer.into());
        self.then(answers)
    }

    /// Ids of the forms shown so far, in order.
    pub fn shown_ids(&self) -> Vec<&str> {
        self.shown.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn shown(&self) -> &[FormSpec] {
        &self.shown
    }

    /// Messages passed to `report_invalid`.
    pub fn rejections(&self) -> &[String] {
        &self.rejected
    }

    /// Answers still queued.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FormRunner for ScriptedFormRunner {
    fn run(&mut self, form: &FormSpec) -> Result<FormAnswers> {
        self.shown.push(form.clone());
        match self.script.pop_front() {
            Some(answers) => Ok(answers),
            None if self.accept_defaults => form.default_answers(),
            None => Err(TetherError::Cancelled),
        }
    }

    fn is_interactive(&self) -> bool {
        !self.non_interactive
    }

    fn report_invalid(&mut self, _form: &FormSpec, error: &TetherError) {
        self.rejected.push(error.to_string());
    }
}
