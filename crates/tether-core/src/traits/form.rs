// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form rendering boundary.

use crate::error::{Result, TetherError};
use crate::form::{FormAnswers, FormSpec};

/// Renders a [`FormSpec`] and blocks until it is answered.
///
/// Implementations own all terminal I/O. Returning [`TetherError::Cancelled`]
/// aborts the surrounding wizard.
pub trait FormRunner: Send {
    /// Shows the form and returns the collected answers.
    fn run(&mut self, form: &FormSpec) -> Result<FormAnswers>;

    /// Whether a rejected answer can be asked for again.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Tells the user why the previous answers were rejected.
    fn report_invalid(&mut self, form: &FormSpec, error: &TetherError) {
        tracing::warn!(form = %form.id, error = %error, "answers rejected");
    }
}
