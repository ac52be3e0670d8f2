// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writer/format negotiation.
//!
//! A writer declares an ordered accept list and a deny list. `*` in the
//! accept list means "anything" and must come last; it may never appear in
//! the deny list.
//!
//! The wildcard short-circuits [`accepts`]: a writer that accepts `*`
//! accepts every format, including ones it also denies. The deny list only
//! steers [`auto_format`] away from formats when the accept list is a bare
//! `*`.

use tether_core::{Result, TetherError};

use crate::writer::WriterDescriptor;

/// Accept-list entry matching every format.
pub const WILDCARD: &str = "*";

/// Requested format that lets the writer choose.
pub const AUTO: &str = "auto";

/// Checks a writer declaration against the registered format names.
///
/// `known` is the combined input and output format set.
pub fn validate_writer(writer: &WriterDescriptor, known: &[&str]) -> Result<()> {
    let fail = |msg: String| Err(TetherError::Internal(format!("writer '{}': {msg}", writer.name)));

    if writer.accept.is_empty() {
        return fail("must accept at least one format, or '*' for all".into());
    }

    let has_wildcard = writer.accept.iter().any(|f| f == WILDCARD);
    if has_wildcard && writer.accept.last().map(String::as_str) != Some(WILDCARD) {
        return fail("'*' must be the last accepted format".into());
    }

    if writer.deny.iter().any(|f| f == WILDCARD) {
        return fail("'*' is not allowed in the deny list".into());
    }

    let is_known = |name: &str| known.iter().any(|k| k.eq_ignore_ascii_case(name));
    for name in writer.accept.iter().filter(|f| *f != WILDCARD) {
        if !is_known(name) {
            return fail(format!("accepted format '{name}' is not registered"));
        }
    }
    for name in &writer.deny {
        if !is_known(name) {
            return fail(format!("denied format '{name}' is not registered"));
        }
    }

    let denies_everything = known
        .iter()
        .all(|k| writer.deny.iter().any(|d| d.eq_ignore_ascii_case(k)));
    if has_wildcard && denies_everything {
        return fail("denies every registered format".into());
    }

    Ok(())
}

/// Whether `writer` takes payloads in `format`.
pub fn accepts(writer: &WriterDescriptor, format: &str) -> bool {
    if writer.accept.iter().any(|f| f == WILDCARD) {
        return true;
    }
    let listed = |list: &[String]| list.iter().any(|f| f.eq_ignore_ascii_case(format));
    listed(&writer.accept) && !listed(&writer.deny)
}

/// Picks a format for `writer` when the caller asked for [`AUTO`].
///
/// - `*` alone: the first of `outputs` not denied;
/// - `*` after literals, or no `*` at all: the first accepted entry.
///
/// `outputs` must be in a fixed order; the registry hands them out sorted.
pub fn auto_format(writer: &WriterDescriptor, outputs: &[&str]) -> Result<String> {
    let first = writer
        .accept
        .first()
        .ok_or_else(|| TetherError::Internal(format!("writer '{}' accepts nothing", writer.name)))?;

    if first != WILDCARD {
        return Ok(first.clone());
    }

    outputs
        .iter()
        .find(|name| !writer.deny.iter().any(|d| d.eq_ignore_ascii_case(name)))
        .map(|name| name.to_string())
        .ok_or_else(|| {
            TetherError::not_found("format", format!("any format accepted by writer '{}'", writer.name))
        })
}
