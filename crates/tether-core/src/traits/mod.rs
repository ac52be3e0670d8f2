// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the orchestrator, vault backends and the UI.

pub mod form;
pub mod vault;

pub use form::FormRunner;
pub use vault::Vault;
