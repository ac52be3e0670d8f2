// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records as compact JSON, for piping into other tools.

use tether_core::{EnvRecord, Result};

use crate::format::Formatter;

#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFormat;

impl Formatter for PassthroughFormat {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_records() {
        let out = PassthroughFormat
            .render(&[EnvRecord::new("A", "1"), EnvRecord::new("B", "2").secret(true)])
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"key":"A","value":"1","is_secret":false},{"key":"B","value":"2","is_secret":true}]"#
        );
    }
}
