// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations.
//!
//! Each command returns its outcome to the caller instead of exiting; only
//! `main` turns errors into exit codes.

pub mod add;
pub mod export;
pub mod init;
pub mod listing;
pub mod remove;
pub mod status;
pub mod sync;
pub mod validate;

use colored::Colorize;
use tether_core::Result;

use crate::app::App;
use crate::cli::{AddCommand, Commands, RemoveCommand};
use crate::prompt::runner_for;

/// Runs one parsed command.
pub async fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Init { accept_defaults } => {
            let mut runner = runner_for(accept_defaults);
            let project = init::run_init(app, runner.as_mut())?;
            done(&format!("created {}", project.path().display()));
        }
        Commands::Add(AddCommand::Vault { kind, name, args }) => {
            let mut runner = runner_for(false);
            let name = add::add_vault(app, runner.as_mut(), kind.as_deref(), name, args).await?;
            done(&format!("added vault '{name}'"));
        }
        Commands::Add(AddCommand::Secret { vault, all }) => {
            let mut runner = runner_for(all);
            let report = add::add_secrets(app, runner.as_mut(), vault.as_deref(), all).await?;
            add::print_report(&report);
        }
        Commands::Remove(RemoveCommand::Vault { name }) => {
            let dropped = remove::remove_vault(app, &name)?;
            done(&format!("removed vault '{name}' and {} secret(s)", dropped.len()));
        }
        Commands::Remove(RemoveCommand::Secret { name }) => {
            remove::remove_secret(app, &name)?;
            done(&format!("removed secret '{name}'"));
        }
        Commands::Pull => {
            let pulled = sync::pull(app).await?;
            done(&format!(
                "pulled {} secret(s) into {}",
                pulled.keys.len(),
                pulled.path.display()
            ));
        }
        Commands::Push => {
            let pushed = sync::push(app).await?;
            done(&format!("pushed {} secret(s)", pushed.len()));
        }
        Commands::Export(args) => {
            export::run_export(app, args.writer.as_deref(), args.format.as_deref())?;
        }
        Commands::Status { json, plain } => status::run_status(app, json, plain)?,
        Commands::Validate => {
            validate::run_validate(app)?;
            done("project file is valid");
        }
        Commands::Vaults => listing::print_vaults(app),
        Commands::Formats => listing::print_formats(app)?,
    }
    Ok(())
}

fn done(message: &str) {
    eprintln!("{} {message}", "ok".green().bold());
}
