// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether init`.

use tether_config::{ProjectFile, ProjectOptions};
use tether_core::{Answer, FormField, FormRunner, FormSpec, Result};
use tracing::info;

use crate::app::App;
use crate::prompt::ask;

/// One yes/no question per project option, defaulting to its current value.
pub fn options_form(options: &ProjectOptions) -> FormSpec {
    options.help().into_iter().fold(
        FormSpec::new("init-options", "Project options")
            .describe("How remote secret names map to local variables"),
        |form, help| {
            form.field(
                FormField::confirm(help.key, help.label)
                    .describe(help.summary)
                    .default_answer(Answer::Bool(help.value)),
            )
        },
    )
}

/// Asks for the project options and creates the environment's project file.
pub fn run_init(app: &App, runner: &mut dyn FormRunner) -> Result<ProjectFile> {
    let mut options = ProjectOptions::default();
    let form = options_form(&options);
    let answers = ask(runner, &form)?;
    for help in options.help() {
        if let Some(value) = answers.get(help.key).and_then(Answer::as_bool) {
            options.set(help.key, value)?;
        }
    }

    let project = ProjectFile::create(&app.workspace, &app.env, options)?;
    info!(env = %app.env, path = %project.path().display(), "initialized project");
    Ok(project)
}
