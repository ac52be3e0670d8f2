// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formatter traits and the format registry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_config::diagnostic::suggest_key;
use tether_config::{ProjectFile, SecretView};
use tether_core::{EnvRecord, Result, TetherError};

/// Read-only project state a formatter may be built with.
///
/// Only formatters that annotate rows with binding metadata look at it;
/// every other formatter ignores it.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Directory record paths are shown relative to.
    pub root: PathBuf,
    /// Secret bindings keyed by local name.
    pub secrets: SecretView,
}

impl RenderContext {
    pub fn new(root: impl Into<PathBuf>, secrets: SecretView) -> Self {
        Self {
            root: root.into(),
            secrets,
        }
    }

    pub fn for_project(project: &ProjectFile) -> Self {
        Self::new(project.dir(), project.secret_view())
    }

    /// A context with no bindings rooted at `root`.
    pub fn bare(root: &Path) -> Self {
        Self::new(root, Arc::default())
    }
}

/// Turns resolved records into an output payload.
pub trait Formatter: Send + Sync {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Renders `records`. Must not depend on anything but the records and
    /// the state the formatter was constructed with.
    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>>;
}

/// Parsed input payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputData {
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

/// A format that can also be read back.
pub trait InputFormat: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when `data` looks like it was produced in this format.
    fn detect(&self, data: &[u8]) -> bool;

    fn parse(&self, data: &[u8]) -> Result<InputData>;
}

/// Builds formatters for a render context.
pub trait FormatFactory: Send + Sync {
    fn create(&self, ctx: &RenderContext) -> Box<dyn Formatter>;
}

impl<F> FormatFactory for F
where
    F: Fn(&RenderContext) -> Box<dyn Formatter> + Send + Sync,
{
    fn create(&self, ctx: &RenderContext) -> Box<dyn Formatter> {
        self(ctx)
    }
}

/// Static metadata about an output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

/// A registered output format.
pub struct FormatEntry {
    pub descriptor: FormatDescriptor,
    factory: Box<dyn FormatFactory>,
}

impl std::fmt::Debug for FormatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Output and input formats keyed by lowercase name.
///
/// Iteration is always in lowercase-name order, which is the order
/// auto-selection and input detection rely on.
#[derive(Default)]
pub struct FormatRegistry {
    outputs: BTreeMap<String, FormatEntry>,
    inputs: BTreeMap<String, Box<dyn InputFormat>>,
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("outputs", &self.output_names())
            .field("inputs", &self.input_names())
            .finish()
    }
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_output(
        &mut self,
        descriptor: FormatDescriptor,
        factory: impl FormatFactory + 'static,
    ) -> Result<()> {
        let key = descriptor.name.to_ascii_lowercase();
        if self.outputs.contains_key(&key) {
            return Err(TetherError::Internal(format!(
                "output format '{}' registered twice",
                descriptor.name
            )));
        }
        self.outputs.insert(
            key,
            FormatEntry {
                descriptor,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    pub fn register_input(&mut self, format: impl InputFormat + 'static) -> Result<()> {
        let key = format.name().to_ascii_lowercase();
        if self.inputs.contains_key(&key) {
            return Err(TetherError::Internal(format!(
                "input format '{}' registered twice",
                format.name()
            )));
        }
        self.inputs.insert(key, Box::new(format));
        Ok(())
    }

    /// Case-insensitive output format lookup.
    pub fn output(&self, name: &str) -> Result<&FormatEntry> {
        self.outputs
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| self.unknown(name))
    }

    /// Builds the named output formatter for `ctx`.
    pub fn create(&self, name: &str, ctx: &RenderContext) -> Result<Box<dyn Formatter>> {
        Ok(self.output(name)?.factory.create(ctx))
    }

    /// Case-insensitive input format lookup.
    pub fn input(&self, name: &str) -> Result<&dyn InputFormat> {
        self.inputs
            .get(&name.to_ascii_lowercase())
            .map(Box::as_ref)
            .ok_or_else(|| self.unknown(name))
    }

    /// Registered spelling of `name` if any input or output format has it.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        let key = name.to_ascii_lowercase();
        self.outputs
            .get(&key)
            .map(|e| e.descriptor.name)
            .or_else(|| self.inputs.get(&key).map(|f| f.name()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    /// Output format names in lowercase order.
    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.values().map(|e| e.descriptor.name).collect()
    }

    /// Input format names in lowercase order.
    pub fn input_names(&self) -> Vec<&'static str> {
        self.inputs.values().map(|f| f.name()).collect()
    }

    /// Every input and output format name, deduplicated, in lowercase order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut all: BTreeMap<String, &'static str> = BTreeMap::new();
        for name in self.output_names().into_iter().chain(self.input_names()) {
            all.insert(name.to_ascii_lowercase(), name);
        }
        all.into_values().collect()
    }

    /// All output entries in lowercase-name order.
    pub fn list_outputs(&self) -> Vec<&FormatEntry> {
        self.outputs.values().collect()
    }

    /// First input format, in name order, that recognises `data`.
    pub fn detect(&self, data: &[u8]) -> Option<&dyn InputFormat> {
        self.inputs
            .values()
            .map(Box::as_ref)
            .find(|format| format.detect(data))
    }

    /// Detects and parses `data` in one go.
    pub fn parse(&self, data: &[u8]) -> Result<(&'static str, InputData)> {
        let format = self
            .detect(data)
            .ok_or_else(|| TetherError::Validation("input is not in a known format".into()))?;
        Ok((format.name(), format.parse(data)?))
    }

    fn unknown(&self, name: &str) -> TetherError {
        let known = self.names();
        let lowered: Vec<String> = known.iter().map(|n| n.to_ascii_lowercase()).collect();
        let refs: Vec<&str> = lowered.iter().map(String::as_str).collect();
        let hint = suggest_key(&name.to_ascii_lowercase(), &refs).and_then(|k| self.canonical(&k));
        let name = match hint {
            Some(hint) => format!("{name} (did you mean '{hint}'?)"),
            None => format!("{name} (known: {})", known.join(", ")),
        };
        TetherError::not_found("format", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Formatter for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
            Ok(format!("{}:{}", self.0, records.len()).into_bytes())
        }
    }

    fn registry() -> FormatRegistry {
        let mut registry = FormatRegistry::new();
        for name in ["zeta", "Alpha", "jsonArr"] {
            registry
                .register_output(
                    FormatDescriptor {
                        name,
                        description: "",
                    },
                    move |_: &RenderContext| -> Box<dyn Formatter> { Box::new(Fixed(name)) },
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn names_are_sorted_case_insensitively() {
        assert_eq!(registry().output_names(), vec!["Alpha", "jsonArr", "zeta"]);
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = registry();
        let formatter = registry.create("JSONARR", &RenderContext::default()).unwrap();
        assert_eq!(formatter.name(), "jsonArr");
        assert_eq!(formatter.render(&[]).unwrap(), b"jsonArr:0");
        assert_eq!(registry.canonical("alpha"), Some("Alpha"));
    }

    #[test]
    fn unknown_name_suggests_registered_spelling() {
        let Err(err) = registry().create("jsonar", &RenderContext::default()) else {
            panic!("misspelled format created a formatter");
        };
        assert!(matches!(err, TetherError::NotFound { .. }));
        assert!(err.to_string().contains("did you mean 'jsonArr'"), "{err}");
    }

    #[test]
    fn duplicate_output_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register_output(
                FormatDescriptor {
                    name: "ZETA",
                    description: "",
                },
                |_: &RenderContext| -> Box<dyn Formatter> { Box::new(Fixed("ZETA")) },
            )
            .unwrap_err();
        assert!(err.to_string().contains("registered twice"));
    }

    #[test]
    fn detect_without_inputs_finds_nothing() {
        assert!(registry().detect(b"A=1").is_none());
        assert!(registry().parse(b"A=1").unwrap_err().is_validation());
    }
}
