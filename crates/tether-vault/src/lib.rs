// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault backends for tether.
//!
//! - [`registry`]: the closed table of backend types;
//! - [`catalog`]: the built-in backends (`test`, `keyvault`, and `local`
//!   with the `keyring` feature);
//! - [`wizard`]: the generic driver for the vault wizard protocol;
//! - [`select`] and [`resolve`]: choosing bound secrets and moving values
//!   between vaults and the local machine.

pub mod backends;
pub mod catalog;
pub mod registry;
pub mod resolve;
pub mod select;
pub mod wizard;

pub use catalog::{builtin_catalog, builtin_registry, builtin_registry_with};
pub use registry::{VaultDescriptor, VaultEntry, VaultFactory, VaultRegistry};
pub use wizard::run_wizard;
