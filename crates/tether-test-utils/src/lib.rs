// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tether integration tests.
//!
//! - [`ScriptedFormRunner`]: replays queued wizard answers
//! - [`CountingDiscoverySource`]: fixed discovery tree with call counters
//! - [`TestProject`]: temporary project directory with a seeded registry
//! - [`LedgerVault`]: a vault that only knows the keys pushed to it

pub mod discovery;
pub mod form_runner;
pub mod ledger;
pub mod project;

pub use discovery::CountingDiscoverySource;
pub use form_runner::ScriptedFormRunner;
pub use ledger::{register_ledger, Ledger, LedgerVault};
pub use project::TestProject;
