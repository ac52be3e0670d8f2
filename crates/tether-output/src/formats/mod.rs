// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in formats.

pub mod azdevops;
pub mod dotenv;
pub mod json;
pub mod passthrough;
pub mod pwsh;
pub mod shell;
pub mod stats;

pub use azdevops::AzDevOpsFormat;
pub use dotenv::DotenvFormat;
pub use json::JsonFormat;
pub use passthrough::PassthroughFormat;
pub use pwsh::PwshFormat;
pub use shell::ShellFormat;
pub use stats::StatsFormat;

use std::collections::BTreeMap;

use tether_core::EnvRecord;

/// Records collapsed to one value per key, later records winning.
pub(crate) fn last_wins(records: &[EnvRecord]) -> BTreeMap<&str, &str> {
    records
        .iter()
        .map(|r| (r.key.as_str(), r.value.as_str()))
        .collect()
}
