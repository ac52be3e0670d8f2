// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether vaults` and `tether formats`.

use tether_core::Result;
use tether_output::Exporter;
use tether_vault::VaultRegistry;

use crate::app::App;

pub fn print_vaults(app: &App) {
    print!("{}", vault_table(&app.registry));
}

pub fn print_formats(app: &App) -> Result<()> {
    print!("{}", format_table(&app.exporter)?);
    Ok(())
}

/// One line per registered backend type.
pub fn vault_table(registry: &VaultRegistry) -> String {
    let width = registry
        .list_all()
        .iter()
        .map(|e| e.descriptor.kind.len())
        .max()
        .unwrap_or(0);
    registry
        .list_all()
        .iter()
        .map(|e| {
            format!(
                "{:<width$}  {} - {}\n",
                e.descriptor.kind, e.descriptor.display_name, e.descriptor.description
            )
        })
        .collect()
}

/// Writers with their declarations, then output and input formats.
pub fn format_table(exporter: &Exporter) -> Result<String> {
    let mut out = String::from("Writers\n");
    for entry in exporter.writers().list_all() {
        let d = &entry.descriptor;
        let auto = exporter.writers().auto_format(&d.name)?;
        out.push_str(&format!("  {:<12} {}\n", d.name, entry.description));
        out.push_str(&format!("  {:<12} accept: {}\n", "", d.accept.join(", ")));
        if !d.deny.is_empty() {
            out.push_str(&format!("  {:<12} deny:   {}\n", "", d.deny.join(", ")));
        }
        out.push_str(&format!("  {:<12} auto:   {auto}\n", ""));
    }

    out.push_str("\nOutput formats\n");
    for entry in exporter.formats().list_outputs() {
        out.push_str(&format!(
            "  {:<12} {}\n",
            entry.descriptor.name, entry.descriptor.description
        ));
    }
    out.push_str(&format!(
        "\nInput formats\n  {}\n",
        exporter.formats().input_names().join(", ")
    ));
    Ok(out)
}
