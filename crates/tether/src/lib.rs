// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tether command-line front end.
//!
//! The binary in `main.rs` only parses arguments, initializes logging and
//! maps errors to exit codes. Everything else lives here so integration
//! tests can drive commands without a terminal.

pub mod app;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod prompt;

pub use app::App;
pub use cli::{Cli, Commands};
