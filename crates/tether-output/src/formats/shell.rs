// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `export KEY=value` lines for POSIX shells.

use tether_config::dotenv::format_line;
use tether_core::{EnvRecord, Result};

use super::last_wins;
use crate::format::Formatter;

/// Registered twice, as `posix` and `bash`.
#[derive(Debug, Clone, Copy)]
pub struct ShellFormat {
    name: &'static str,
}

impl ShellFormat {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Formatter for ShellFormat {
    fn name(&self) -> &'static str {
        self.name
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        let lines: Vec<String> = last_wins(records)
            .into_iter()
            .map(|(key, value)| format!("export {}", format_line(key, value)))
            .collect();
        Ok(lines.join("\n").into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_each_key() {
        let out = ShellFormat::new("posix")
            .render(&[EnvRecord::new("B", "a b"), EnvRecord::new("A", "1")])
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "export A=1\nexport B='a b'");
    }

    #[test]
    fn name_follows_registration() {
        assert_eq!(ShellFormat::new("bash").name(), "bash");
    }
}
