// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in writers.

pub mod github;
pub mod stdout;

pub use github::{GithubTarget, GithubWriter};
pub use stdout::StreamWriter;
