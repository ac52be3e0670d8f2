// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overview table of every record with binding metadata.

use std::path::{Path, PathBuf};

use tether_config::SecretView;
use tether_core::{EnvRecord, Result};
use tether_security::detect;

use crate::format::Formatter;

const HEADERS: [&str; 5] = ["Name", "Tags", "Path", "Vault", "Reason"];

/// Renders an aligned `Name | Tags | Path | Vault | Reason` table.
///
/// Tags are `sec` for bound or detected secrets and `dup` for keys that
/// appear more than once. Paths are shown relative to `root`.
#[derive(Debug, Clone)]
pub struct StatsFormat {
    secrets: SecretView,
    root: PathBuf,
}

impl StatsFormat {
    pub fn new(secrets: SecretView, root: impl Into<PathBuf>) -> Self {
        Self {
            secrets,
            root: root.into(),
        }
    }

    fn row(&self, record: &EnvRecord, records: &[EnvRecord]) -> [String; 5] {
        let binding = self.secrets.get(&record.key);
        let mut reason = String::new();
        let secret = binding.is_some() || {
            let detected = detect(&record.key, &record.value);
            if let Some(r) = &detected {
                reason = r.to_string();
            }
            detected.is_some()
        };

        let mut tags = Vec::new();
        if secret {
            tags.push("sec");
        }
        if records.iter().filter(|r| r.key == record.key).count() > 1 {
            tags.push("dup");
        }

        [
            record.key.clone(),
            tags.join(","),
            record
                .file
                .as_deref()
                .map(|p| relative(p, &self.root))
                .unwrap_or_default(),
            binding.map(|b| b.vault.clone()).unwrap_or_default(),
            reason,
        ]
    }
}

impl Formatter for StatsFormat {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        let mut sorted: Vec<&EnvRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        let rows: Vec<[String; 5]> = sorted.iter().map(|r| self.row(r, records)).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, HEADERS.iter().copied(), &widths);
        push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
        for row in &rows {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        Ok(out.into_bytes())
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: impl Iterator<Item = S>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use tether_config::SecretBinding;

    use super::*;

    fn view() -> SecretView {
        let mut secrets = BTreeMap::new();
        secrets.insert("MY_KEY".to_string(), SecretBinding::new("main", "mykey"));
        Arc::new(secrets)
    }

    #[test]
    fn renders_aligned_table() {
        let root = PathBuf::from("/repo");
        let stats = StatsFormat::new(view(), &root);
        let out = stats
            .render(&[
                EnvRecord::new("PORT", "8080").from_file("/repo/.env"),
                EnvRecord::new("MY_KEY", "myvalue").from_file("/repo/app/.env.secret"),
                EnvRecord::new("DB_PASSWORD", "x").from_file("/repo/.env"),
                EnvRecord::new("PORT", "9090").from_file("/repo/app/.env"),
            ])
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        let expected = "\
Name         Tags  Path             Vault  Reason
-----------  ----  ---------------  -----  -------------------------
DB_PASSWORD  sec   .env                    Keyword 'PASSWORD' in key
MY_KEY       sec   app/.env.secret  main
PORT         dup   .env
PORT         dup   app/.env
";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_records_render_header_only() {
        let out = StatsFormat::new(Arc::default(), "/").render(&[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name  Tags  Path  Vault  Reason\n----  ----  ----  -----  ------\n");
    }
}
