// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PowerShell `Set-Item` statements.

use tether_core::{EnvRecord, Result};

use crate::format::Formatter;

#[derive(Debug, Default, Clone, Copy)]
pub struct PwshFormat;

impl Formatter for PwshFormat {
    fn name(&self) -> &'static str {
        "pwsh"
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        let lines: Vec<String> = records
            .iter()
            .map(|r| format!("Set-Item \"env:{}\" -value {}", r.key, literal(&r.value)))
            .collect();
        Ok(lines.join("\n").into_bytes())
    }
}

/// Integers stay bare, booleans become `$true`/`$false`, everything else
/// is a double-quoted string with backtick escapes.
fn literal(value: &str) -> String {
    if is_integer(value) {
        return value.to_string();
    }
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        return format!("${}", value.to_ascii_lowercase());
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '`' | '$') {
            out.push('`');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_by_shape() {
        assert_eq!(literal("42"), "42");
        assert_eq!(literal("-7"), "-7");
        assert_eq!(literal("True"), "$true");
        assert_eq!(literal("false"), "$false");
        assert_eq!(literal("hello"), "\"hello\"");
        assert_eq!(literal("1.5"), "\"1.5\"");
        assert_eq!(literal("-"), "\"-\"");
    }

    #[test]
    fn escapes_quotes_and_variables() {
        assert_eq!(literal("say \"hi\" $HOME"), "\"say `\"hi`\" `$HOME\"");
    }

    #[test]
    fn keeps_record_order() {
        let out = PwshFormat
            .render(&[EnvRecord::new("B", "2"), EnvRecord::new("A", "x")])
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Set-Item \"env:B\" -value 2\nSet-Item \"env:A\" -value \"x\""
        );
    }
}
