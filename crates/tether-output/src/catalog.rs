// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The built-in format and writer tables.

use tether_core::Result;

use crate::export::Exporter;
use crate::format::{FormatDescriptor, FormatRegistry, Formatter, RenderContext};
use crate::formats::{
    AzDevOpsFormat, DotenvFormat, JsonFormat, PassthroughFormat, PwshFormat, ShellFormat,
    StatsFormat,
};
use crate::writer::{Writer, WriterDescriptor, WriterRegistry};
use crate::writers::{GithubTarget, GithubWriter, StreamWriter};

/// Output formats that need nothing from the render context.
fn stateless(name: &'static str) -> Box<dyn Formatter> {
    match name {
        "azdevops" => Box::new(AzDevOpsFormat),
        "dotenv" => Box::new(DotenvFormat),
        "json" => Box::new(JsonFormat::object()),
        "jsonArr" => Box::new(JsonFormat::array()),
        "passthrough" => Box::new(PassthroughFormat),
        "pwsh" => Box::new(PwshFormat),
        shell => Box::new(ShellFormat::new(shell)),
    }
}

const STATELESS: &[(&str, &str)] = &[
    ("azdevops", "Azure Pipelines setvariable commands"),
    ("bash", "export KEY=value lines"),
    ("dotenv", "KEY=value lines, sorted"),
    ("json", "JSON object, sorted by key"),
    ("jsonArr", "JSON array of key/value pairs"),
    ("passthrough", "Raw records as JSON"),
    ("posix", "export KEY=value lines"),
    ("pwsh", "PowerShell Set-Item statements"),
];

/// Every built-in output format plus the readable ones.
pub fn builtin_formats() -> Result<FormatRegistry> {
    let mut formats = FormatRegistry::new();
    for &(name, description) in STATELESS {
        formats.register_output(
            FormatDescriptor { name, description },
            move |_: &RenderContext| -> Box<dyn Formatter> { stateless(name) },
        )?;
    }
    formats.register_output(
        FormatDescriptor {
            name: "stats",
            description: "Table of keys with tags, files and vaults",
        },
        |ctx: &RenderContext| -> Box<dyn Formatter> {
            Box::new(StatsFormat::new(ctx.secrets.clone(), ctx.root.clone()))
        },
    )?;

    formats.register_input(DotenvFormat)?;
    formats.register_input(JsonFormat::object())?;
    formats.register_input(JsonFormat::array())?;
    Ok(formats)
}

/// The built-in writers, validated against `formats`.
pub fn builtin_writers(formats: &FormatRegistry) -> Result<WriterRegistry> {
    let mut writers = WriterRegistry::new(formats);
    writers.register(
        WriterDescriptor::new("stdout", &["dotenv", "*"], &[]),
        "Standard output",
        || -> Result<Box<dyn Writer>> { Ok(Box::new(StreamWriter::stdout())) },
    )?;
    for target in [GithubTarget::Env, GithubTarget::Output] {
        writers.register(
            WriterDescriptor::new(target.writer_name(), &["dotenv"], &[]),
            match target {
                GithubTarget::Env => "Appends to $GITHUB_ENV",
                GithubTarget::Output => "Appends to $GITHUB_OUTPUT",
            },
            move || -> Result<Box<dyn Writer>> { Ok(Box::new(GithubWriter::from_env(target)?)) },
        )?;
    }
    Ok(writers)
}

/// Both built-in registries behind one [`Exporter`].
pub fn builtin_exporter() -> Result<Exporter> {
    let formats = builtin_formats()?;
    let writers = builtin_writers(&formats)?;
    Ok(Exporter::new(formats, writers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_validate() {
        let exporter = builtin_exporter().unwrap();
        assert_eq!(
            exporter.formats().output_names(),
            vec!["azdevops", "bash", "dotenv", "json", "jsonArr", "passthrough", "posix", "pwsh", "stats"]
        );
        assert_eq!(exporter.formats().input_names(), vec!["dotenv", "json", "jsonArr"]);
        assert_eq!(exporter.writers().names(), vec!["github-env", "github-out", "stdout"]);
    }

    #[test]
    fn registered_names_match_formatters() {
        let formats = builtin_formats().unwrap();
        for name in formats.output_names() {
            let formatter = formats.create(name, &RenderContext::default()).unwrap();
            assert_eq!(formatter.name(), name);
        }
    }

    #[test]
    fn builtin_auto_formats() {
        let exporter = builtin_exporter().unwrap();
        for writer in exporter.writers().names() {
            assert_eq!(exporter.writers().auto_format(writer).unwrap(), "dotenv");
        }
    }

    #[test]
    fn detects_input_formats() {
        let formats = builtin_formats().unwrap();
        assert_eq!(formats.detect(b"A=1\n").unwrap().name(), "dotenv");
        assert_eq!(formats.detect(b"{\"A\": \"1\"}").unwrap().name(), "json");
        assert_eq!(formats.detect(b"[\"A\"]").unwrap().name(), "jsonArr");
    }
}
