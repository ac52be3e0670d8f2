// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for log output and error messages.
//!
//! Two complementary mechanisms:
//! 1. **Regex-based**: token shapes from the classifier plus bearer headers.
//! 2. **Exact-match**: values pulled from vaults during this run.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

use crate::classifier::PATTERNS;

/// Values registered for exact-match redaction, shared with the log writer.
pub type SecretList = Arc<RwLock<Vec<String>>>;

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9._\-]{10,}").unwrap());

/// The redaction placeholder.
const REDACTED: &str = "[REDACTED]";

/// Redact secrets from a string using regex patterns and exact values.
///
/// Whole-value shapes (hex and base64 runs) are skipped here; they only make
/// sense when classifying a complete value, not a log line.
pub fn redact(input: &str, secret_values: &[String]) -> String {
    let mut result = BEARER.replace_all(input, REDACTED).to_string();

    for pattern in PATTERNS.values().filter(|re| !re.as_str().starts_with('^')) {
        result = pattern.replace_all(&result, REDACTED).to_string();
    }

    let mut sorted: Vec<&String> = secret_values.iter().collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in sorted {
        if !value.is_empty() {
            result = result.replace(value.as_str(), REDACTED);
        }
    }

    result
}

/// A writer wrapper that redacts secrets before forwarding bytes.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: SecretList,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: SecretList) -> Self {
        Self { inner, secrets }
    }

    /// Registers a value for exact-match redaction.
    pub fn register(secrets: &SecretList, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Ok(mut values) = secrets.write()
            && !values.iter().any(|v| v == value)
        {
            values.push(value.to_string());
        }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let values = self
            .secrets
            .read()
            .map(|v| v.clone())
            .unwrap_or_default();
        self.inner.write_all(redact(&input, &values).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
