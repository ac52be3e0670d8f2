// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tether - bind local environment variables to secrets in pluggable vaults.
//!
//! This is the binary entry point. It is the only place errors become exit
//! codes.

use std::sync::{Arc, RwLock};

use clap::Parser;
use colored::Colorize;
use tether::commands::dispatch;
use tether::logging::init_tracing;
use tether::{App, Cli};
use tether_core::TetherError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate tool configuration at startup
    let loaded = match &cli.config {
        Some(path) => tether_config::load_and_validate_path(path),
        None => tether_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tether_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    let secrets = Arc::new(RwLock::new(Vec::new()));
    init_tracing(&cli.log_level(&config.general.log_level), secrets.clone());

    let result = match App::new(config, cli.env.as_deref(), secrets) {
        Ok(app) => dispatch(&app, cli.command).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        fail(&err);
    }
}

fn fail(err: &TetherError) -> ! {
    match err {
        TetherError::Cancelled => eprintln!("{}", "cancelled".yellow()),
        other => eprintln!("{} {other}", "error:".red().bold()),
    }
    std::process::exit(err.exit_code());
}
