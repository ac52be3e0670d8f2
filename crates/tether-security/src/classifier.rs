// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic secret detection for key/value pairs.
//!
//! Checks run in a fixed order and the first hit wins:
//! 1. keyword in the key name (case-insensitive),
//! 2. value shape against named patterns, in name order,
//! 3. Shannon entropy of the value above [`ENTROPY_THRESHOLD`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Bits per character above which a value is treated as random.
pub const ENTROPY_THRESHOLD: f64 = 4.5;

/// Key fragments that mark a value as sensitive. Checked in order.
const KEYWORDS: &[&str] = &[
    "PASSWORD",
    "PASSWD",
    "SECRET",
    "PRIVATE_KEY",
    "PRIVATEKEY",
    "API_KEY",
    "APIKEY",
    "ACCESS_KEY",
    "CREDENTIAL",
    "CONNECTION_STRING",
    "CONNSTR",
];

/// Named value shapes. A `BTreeMap` keeps evaluation sorted by name.
pub(crate) static PATTERNS: LazyLock<BTreeMap<&'static str, Regex>> = LazyLock::new(|| {
    [
        ("AWS Access Key ID", r"\b(AKIA|ASIA)[0-9A-Z]{16}\b"),
        ("GitHub Token", r"\bgh[pousr]_[A-Za-z0-9]{36,}\b"),
        ("Google API Key", r"\bAIza[0-9A-Za-z_\-]{35}\b"),
        (
            "JSON Web Token",
            r"\beyJ[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}",
        ),
        ("Long base64 run", r"^[A-Za-z0-9+/]{64,}={0,2}$"),
        ("Long hex run", r"^[0-9a-fA-F]{32,}$"),
        ("PEM private key", r"-----BEGIN ([A-Z0-9]+ )*PRIVATE KEY-----"),
        ("Slack Token", r"\bxox[abposr]-[0-9A-Za-z\-]{10,}"),
        ("Stripe Secret Key", r"\b[rs]k_(live|test)_[0-9A-Za-z]{24,}\b"),
    ]
    .into_iter()
    .map(|(name, re)| (name, Regex::new(re).unwrap()))
    .collect()
});

/// Why a pair was flagged.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    /// The key contains a sensitive keyword.
    Keyword(&'static str),
    /// The value matches a named pattern.
    Pattern(&'static str),
    /// The value looks random. Carries the measured bits per character.
    HighEntropy(f64),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "Keyword '{k}' in key"),
            Self::Pattern(name) => f.write_str(name),
            Self::HighEntropy(_) => f.write_str("High entropy value"),
        }
    }
}

/// Classifies a key/value pair. Empty values are never flagged.
pub fn detect(key: &str, value: &str) -> Option<Reason> {
    if value.is_empty() {
        return None;
    }

    let upper = key.to_ascii_uppercase();
    if let Some(keyword) = KEYWORDS.iter().find(|k| upper.contains(*k)) {
        return Some(Reason::Keyword(keyword));
    }

    if let Some((name, _)) = PATTERNS.iter().find(|(_, re)| re.is_match(value)) {
        return Some(Reason::Pattern(name));
    }

    let entropy = shannon_entropy(value);
    (entropy > ENTROPY_THRESHOLD).then_some(Reason::HighEntropy(entropy))
}

/// Shannon entropy over the character distribution, in bits per character.
///
/// Terms are summed in character order so the result is bit-for-bit stable.
pub fn shannon_entropy(value: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in value.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
