// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether validate`.

use tether_config::diagnostic::into_tether_error;
use tether_config::validation::validate_project;
use tether_config::{render_errors, ConfigError, ProjectFile};
use tether_core::{Result, TetherError};

use crate::app::App;

/// Every problem found in the environment's project file.
pub fn check(app: &App) -> std::result::Result<ProjectFile, Vec<ConfigError>> {
    let project = ProjectFile::load(&app.workspace, &app.env)?;
    validate_project(&project, &app.registry.kinds())?;
    Ok(project)
}

/// Renders every problem as a diagnostic and fails if there was any.
pub fn run_validate(app: &App) -> Result<()> {
    match ProjectFile::load(&app.workspace, &app.env) {
        Err(errors) => {
            render_errors(&errors);
            Err(into_tether_error(errors))
        }
        Ok(project) => match validate_project(&project, &app.registry.kinds()) {
            Ok(()) => Ok(()),
            Err(errors) => {
                render_errors(&errors);
                Err(TetherError::Validation(format!(
                    "{} problem(s) in {}",
                    errors.len(),
                    project.path().display()
                )))
            }
        },
    }
}
