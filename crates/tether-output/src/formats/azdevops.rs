// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Azure Pipelines logging commands.

use tether_core::{EnvRecord, Result};
use tether_security::detect;
use tracing::{debug, info};

use crate::format::Formatter;

/// One `##vso[task.setvariable ...]` command per record. Values that are
/// bound, or that the classifier flags, are marked secret so the pipeline
/// masks them.
#[derive(Debug, Default, Clone, Copy)]
pub struct AzDevOpsFormat;

impl Formatter for AzDevOpsFormat {
    fn name(&self) -> &'static str {
        "azdevops"
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        let mut out = String::new();
        for record in records {
            let secret = record.is_secret || {
                let reason = detect(&record.key, &record.value);
                if let Some(reason) = &reason {
                    debug!(key = %record.key, %reason, "marking detected secret");
                }
                reason.is_some()
            };
            info!(key = %record.key, secret, "setting variable");
            out.push_str(&format!(
                "##vso[task.setvariable variable={};issecret={}]{}\n",
                record.key, secret, record.value
            ));
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[EnvRecord]) -> String {
        String::from_utf8(AzDevOpsFormat.render(records).unwrap()).unwrap()
    }

    #[test]
    fn bound_records_are_secret() {
        let out = render(&[EnvRecord::new("A", "1"), EnvRecord::new("B", "2").secret(true)]);
        assert_eq!(
            out,
            "##vso[task.setvariable variable=A;issecret=false]1\n\
             ##vso[task.setvariable variable=B;issecret=true]2\n"
        );
    }

    #[test]
    fn detected_records_are_secret() {
        let out = render(&[EnvRecord::new("DB_PASSWORD", "12345")]);
        assert_eq!(out, "##vso[task.setvariable variable=DB_PASSWORD;issecret=true]12345\n");
    }
}
