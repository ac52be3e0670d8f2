// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output formats and writers for tether.
//!
//! A [`FormatRegistry`] turns resolved [`EnvRecord`](tether_core::EnvRecord)s
//! into bytes, a [`WriterRegistry`] knows where those bytes can go, and the
//! [`negotiate`] rules decide which format a writer takes. Both registries
//! are built once by [`catalog::builtin_exporter`] and validated when
//! writers are registered, so a malformed accept/deny declaration fails at
//! startup rather than at export time.

pub mod catalog;
pub mod export;
pub mod format;
pub mod formats;
pub mod negotiate;
pub mod writer;
pub mod writers;

pub use catalog::{builtin_exporter, builtin_formats, builtin_writers};
pub use export::Exporter;
pub use format::{
    FormatDescriptor, FormatEntry, FormatFactory, FormatRegistry, Formatter, InputData,
    InputFormat, RenderContext,
};
pub use negotiate::{accepts, auto_format, validate_writer, AUTO, WILDCARD};
pub use writer::{Writer, WriterDescriptor, WriterEntry, WriterFactory, WriterRegistry};
