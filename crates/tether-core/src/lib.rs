// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for tether.
//!
//! This crate provides the error taxonomy, the record and secret types that
//! flow between vaults and formatters, the declarative form model used by
//! vault wizards, and the [`Vault`] capability trait every backend
//! implements.

pub mod error;
pub mod form;
pub mod traits;
pub mod types;
pub mod wizard;

pub use error::{Result, TetherError};
pub use form::{Answer, FieldKind, FormAnswers, FormField, FormOption, FormSpec, Validator};
pub use traits::{FormRunner, Vault};
pub use types::{ConfigBlob, EnvRecord, RemoteSecret, SecretContent, WizardArgs};
pub use wizard::{WizardMachine, WizardState};
