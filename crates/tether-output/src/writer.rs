// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writer trait and the writer registry.

use std::collections::BTreeMap;

use tether_config::diagnostic::suggest_key;
use tether_core::{Result, TetherError};
use tracing::debug;

use crate::format::FormatRegistry;
use crate::negotiate;

/// A writer's name and format declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterDescriptor {
    pub name: String,
    /// Accepted formats in preference order. `*` may only come last.
    pub accept: Vec<String>,
    /// Formats refused even though the accept list would match them.
    pub deny: Vec<String>,
}

impl WriterDescriptor {
    pub fn new(name: impl Into<String>, accept: &[&str], deny: &[&str]) -> Self {
        Self {
            name: name.into(),
            accept: accept.iter().map(|s| s.to_string()).collect(),
            deny: deny.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// An output sink.
pub trait Writer: Send {
    fn name(&self) -> &str;

    /// Delivers a rendered payload.
    fn write(&mut self, payload: &[u8]) -> Result<()>;
}

/// Builds writers. Creation may fail when the sink's environment is missing.
pub trait WriterFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Writer>>;
}

impl<F> WriterFactory for F
where
    F: Fn() -> Result<Box<dyn Writer>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Writer>> {
        self()
    }
}

/// A registered writer.
pub struct WriterEntry {
    pub descriptor: WriterDescriptor,
    pub description: &'static str,
    factory: Box<dyn WriterFactory>,
}

impl std::fmt::Debug for WriterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterEntry")
            .field("descriptor", &self.descriptor)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Writers keyed by lowercase name, validated against a fixed format set.
#[derive(Debug)]
pub struct WriterRegistry {
    entries: BTreeMap<String, WriterEntry>,
    known: Vec<&'static str>,
    outputs: Vec<&'static str>,
}

impl WriterRegistry {
    /// An empty registry whose writers are checked against `formats`.
    pub fn new(formats: &FormatRegistry) -> Self {
        Self {
            entries: BTreeMap::new(),
            known: formats.names(),
            outputs: formats.output_names(),
        }
    }

    /// Registers a writer after validating its accept/deny declaration.
    pub fn register(
        &mut self,
        descriptor: WriterDescriptor,
        description: &'static str,
        factory: impl WriterFactory + 'static,
    ) -> Result<()> {
        negotiate::validate_writer(&descriptor, &self.known)?;
        let key = descriptor.name.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Err(TetherError::Internal(format!(
                "writer '{}' registered twice",
                descriptor.name
            )));
        }
        debug!(writer = %descriptor.name, accept = ?descriptor.accept, deny = ?descriptor.deny, "registered writer");
        self.entries.insert(
            key,
            WriterEntry {
                descriptor,
                description,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Result<&WriterEntry> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| self.unknown(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Writer>> {
        self.get(name)?.factory.create()
    }

    /// Writer names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.values().map(|e| e.descriptor.name.as_str()).collect()
    }

    /// All entries, sorted by name.
    pub fn list_all(&self) -> Vec<&WriterEntry> {
        self.entries.values().collect()
    }

    pub fn accepts(&self, writer: &str, format: &str) -> Result<bool> {
        Ok(negotiate::accepts(&self.get(writer)?.descriptor, format))
    }

    /// The format `writer` picks for [`negotiate::AUTO`].
    pub fn auto_format(&self, writer: &str) -> Result<String> {
        negotiate::auto_format(&self.get(writer)?.descriptor, &self.outputs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unknown(&self, name: &str) -> TetherError {
        let known: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        let name = match suggest_key(&name.to_ascii_lowercase(), &known) {
            Some(hint) => format!("{name} (did you mean '{hint}'?)"),
            None => format!("{name} (known: {})", known.join(", ")),
        };
        TetherError::not_found("writer", name)
    }
}
