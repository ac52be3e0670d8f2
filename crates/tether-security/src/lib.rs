// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security helpers for tether.
//!
//! Provides the heuristic secret classifier used when rendering
//! environment records, a redacting writer that keeps pulled values out of
//! log output, and HTTPS enforcement for backend HTTP clients.

pub mod classifier;
pub mod redact;
pub mod tls;

pub use classifier::{detect, Reason};
pub use redact::{redact, RedactingWriter, SecretList};
pub use tls::{build_secure_client, is_localhost, validate_url};
