// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether export`.

use tether_config::dotenv::collect_records;
use tether_core::{EnvRecord, Result};
use tether_output::{RenderContext, Writer};

use crate::app::App;

/// Writer and format names after applying the configured defaults.
pub fn targets<'a>(app: &'a App, writer: Option<&'a str>, format: Option<&'a str>) -> (&'a str, &'a str) {
    (
        writer.unwrap_or(&app.config.output.default_writer),
        format.unwrap_or(&app.config.output.default_format),
    )
}

/// Every record of the environment plus the context formats render with.
pub fn gather(app: &App) -> Result<(Vec<EnvRecord>, RenderContext)> {
    let project = app.project()?;
    let records = collect_records(&app.workspace, &project)?;
    for record in records.iter().filter(|r| r.is_secret) {
        app.conceal(&record.value);
    }
    Ok((records, RenderContext::for_project(&project)))
}

/// Exports through a fresh instance of the named writer. Returns the format
/// used.
pub fn run_export(app: &App, writer: Option<&str>, format: Option<&str>) -> Result<&'static str> {
    let (writer, format) = targets(app, writer, format);
    let (records, ctx) = gather(app)?;
    app.exporter.export(&records, writer, format, &ctx)
}

/// Like [`run_export`], delivering to `sink` under `writer`'s declaration.
pub fn export_into(
    app: &App,
    writer: Option<&str>,
    format: Option<&str>,
    sink: &mut dyn Writer,
) -> Result<&'static str> {
    let (writer, format) = targets(app, writer, format);
    let (records, ctx) = gather(app)?;
    app.exporter.export_to(&records, writer, format, &ctx, sink)
}
