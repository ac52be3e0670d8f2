// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `.env` file store.
//!
//! Parsing is delegated to `dotenvy` without touching the process
//! environment. Writing produces sorted `KEY=value` lines that `dotenvy`
//! reads back unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tether_core::{EnvRecord, Result, TetherError};
use tracing::debug;

use crate::locate::{env_of_dotenv_file, MatchMode, Workspace};
use crate::project::ProjectFile;

/// Reads a `.env` file into a sorted map without expanding into the process env.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;
    let mut out = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| map_dotenv_error(path, e))?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Parses `.env` content from memory.
pub fn parse_env(content: &[u8]) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for item in dotenvy::from_read_iter(content) {
        let (key, value) =
            item.map_err(|e| TetherError::Serialization(format!("invalid dotenv content: {e}")))?;
        out.insert(key, value);
    }
    Ok(out)
}

fn map_dotenv_error(path: &Path, e: dotenvy::Error) -> TetherError {
    match e {
        dotenvy::Error::Io(source) => TetherError::io(path, source),
        other => TetherError::Serialization(format!("{}: {other}", path.display())),
    }
}

/// Overwrites `path` with the given pairs.
pub fn write_env_file(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    std::fs::write(path, render_env(values)).map_err(|e| TetherError::io(path, e))
}

/// Merges `values` into `path`, keeping keys not mentioned. Creates the file if missing.
pub fn upsert_env_file(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    let mut merged = if path.exists() {
        read_env_file(path)?
    } else {
        BTreeMap::new()
    };
    merged.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
    debug!(path = %path.display(), keys = values.len(), "updating env file");
    write_env_file(path, &merged)
}

/// Renders pairs as `.env` content, one line per key, sorted.
pub fn render_env<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut out = String::new();
    for (key, value) in values {
        out.push_str(&format_line(key, value));
        out.push('\n');
    }
    out
}

/// One `KEY=value` line without the trailing newline.
pub fn format_line(key: &str, value: &str) -> String {
    format!("{key}={}", quote_value(value))
}

/// Leaves simple values bare, single-quotes the rest, and falls back to
/// escaped double quotes when the value itself contains a single quote.
pub fn quote_value(value: &str) -> String {
    if value.chars().all(is_bare_char) {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | ':' | '@' | '+' | ',' | '-')
}

/// File names holding values for `env`.
pub fn dotenv_patterns(env: &str) -> Vec<String> {
    if env.is_empty() {
        vec![".env".into(), ".env.secret".into()]
    } else {
        vec![format!("{env}.env"), format!(".env.{env}"), format!(".env.secret.{env}")]
    }
}

/// Every key/value pair from the project's `.env` files for its environment.
///
/// Deeper files come first. A record is secret when its key is bound.
pub fn collect_records(ws: &Workspace, project: &ProjectFile) -> Result<Vec<EnvRecord>> {
    let patterns = dotenv_patterns(project.env());
    let refs: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let mut files: Vec<PathBuf> = ws.search(&refs, MatchMode::IExact)?;
    files.sort_by_key(|f| std::cmp::Reverse(f.components().count()));

    let mut out = Vec::new();
    for file in files {
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if env_of_dotenv_file(name)? != project.env() {
            debug!(file = %file.display(), "skipping env file for another environment");
            continue;
        }
        for (key, value) in read_env_file(&file)? {
            let is_secret = project.secrets().contains_key(&key);
            out.push(EnvRecord::new(key, value).secret(is_secret).from_file(&file));
        }
    }
    Ok(out)
}
