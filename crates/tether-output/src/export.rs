// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering records and handing them to a writer.

use tether_core::{EnvRecord, Result, TetherError};
use tracing::{debug, info};

use crate::format::{FormatRegistry, RenderContext};
use crate::negotiate::{self, AUTO};
use crate::writer::{Writer, WriterRegistry};

/// Format and writer registries used together by `export`.
#[derive(Debug)]
pub struct Exporter {
    formats: FormatRegistry,
    writers: WriterRegistry,
}

impl Exporter {
    pub fn new(formats: FormatRegistry, writers: WriterRegistry) -> Self {
        Self { formats, writers }
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn writers(&self) -> &WriterRegistry {
        &self.writers
    }

    /// Resolves `requested` (a format name or `auto`) to the output format
    /// `writer` will receive.
    pub fn negotiate(&self, writer: &str, requested: &str) -> Result<&'static str> {
        let entry = self.writers.get(writer)?;
        if requested.eq_ignore_ascii_case(AUTO) {
            let chosen = negotiate::auto_format(&entry.descriptor, &self.formats.output_names())?;
            debug!(writer = %entry.descriptor.name, format = %chosen, "auto-selected format");
            return Ok(self.formats.output(&chosen)?.descriptor.name);
        }

        let format = self.formats.output(requested)?.descriptor.name;
        if !negotiate::accepts(&entry.descriptor, format) {
            return Err(TetherError::Validation(format!(
                "writer '{}' does not accept format '{format}' (accepts: {})",
                entry.descriptor.name,
                entry.descriptor.accept.join(", ")
            )));
        }
        Ok(format)
    }

    /// Renders `records` in `format` without writing them anywhere.
    pub fn render(&self, records: &[EnvRecord], format: &str, ctx: &RenderContext) -> Result<Vec<u8>> {
        self.formats.create(format, ctx)?.render(records)
    }

    /// Negotiates, renders and writes to a fresh instance of `writer`.
    /// Returns the format used.
    pub fn export(
        &self,
        records: &[EnvRecord],
        writer: &str,
        requested: &str,
        ctx: &RenderContext,
    ) -> Result<&'static str> {
        let (format, payload) = self.prepare(records, writer, requested, ctx)?;
        let mut sink = self.writers.create(writer)?;
        self.deliver(sink.as_mut(), format, &payload, records.len())?;
        Ok(format)
    }

    /// Like [`export`](Self::export), but writes to `sink` using the
    /// declaration registered for `writer`.
    pub fn export_to(
        &self,
        records: &[EnvRecord],
        writer: &str,
        requested: &str,
        ctx: &RenderContext,
        sink: &mut dyn Writer,
    ) -> Result<&'static str> {
        let (format, payload) = self.prepare(records, writer, requested, ctx)?;
        self.deliver(sink, format, &payload, records.len())?;
        Ok(format)
    }

    fn prepare(
        &self,
        records: &[EnvRecord],
        writer: &str,
        requested: &str,
        ctx: &RenderContext,
    ) -> Result<(&'static str, Vec<u8>)> {
        let format = self.negotiate(writer, requested)?;
        let payload = self.render(records, format, ctx)?;
        Ok((format, payload))
    }

    fn deliver(&self, sink: &mut dyn Writer, format: &str, payload: &[u8], count: usize) -> Result<()> {
        sink.write(payload)?;
        info!(writer = sink.name(), format, records = count, "exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_exporter;
    use crate::writers::StreamWriter;

    #[test]
    fn auto_to_stdout_renders_dotenv() {
        let exporter = builtin_exporter().unwrap();
        let mut sink = StreamWriter::new(Vec::new());
        let format = exporter
            .export_to(
                &[EnvRecord::new("MY_KEY", "myvalue")],
                "stdout",
                "auto",
                &RenderContext::default(),
                &mut sink,
            )
            .unwrap();
        assert_eq!(format, "dotenv");
        assert_eq!(sink.into_inner(), b"MY_KEY=myvalue\n");
    }

    #[test]
    fn explicit_format_is_canonicalised() {
        let exporter = builtin_exporter().unwrap();
        assert_eq!(exporter.negotiate("STDOUT", "JSONARR").unwrap(), "jsonArr");
    }

    #[test]
    fn refused_format_is_a_validation_error() {
        let exporter = builtin_exporter().unwrap();
        let err = exporter.negotiate("github-env", "json").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("accepts: dotenv"));
    }

    #[test]
    fn unknown_names_are_not_found() {
        let exporter = builtin_exporter().unwrap();
        assert!(matches!(
            exporter.negotiate("stdout", "yaml").unwrap_err(),
            TetherError::NotFound { .. }
        ));
        assert!(matches!(
            exporter.negotiate("slack", "auto").unwrap_err(),
            TetherError::NotFound { .. }
        ));
    }

    #[test]
    fn format_errors_win_over_missing_writer_environment() {
        let exporter = builtin_exporter().unwrap();
        let err = exporter
            .export(&[], "github-out", "pwsh", &RenderContext::default())
            .unwrap_err();
        assert!(err.is_validation());
    }
}
