// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Bind local environment variables to secrets in pluggable vaults.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about, long_about = None)]
pub struct Cli {
    /// Environment to work on. Empty selects the default environment.
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// More logging: `-v` for debug, `-vv` for trace. Overrides `--log-level`.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Tool configuration file, instead of the standard search path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level, given the one from the tool configuration.
    pub fn log_level(&self, configured: &str) -> String {
        match self.verbose {
            0 => self.log_level.as_deref().unwrap_or(configured).to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project file for an environment.
    Init {
        /// Take every option's default without asking.
        #[arg(long)]
        accept_defaults: bool,
    },
    /// Add a vault or bind secrets from one.
    #[command(subcommand)]
    Add(AddCommand),
    /// Remove a vault (and its secrets) or a single secret binding.
    #[command(subcommand)]
    Remove(RemoveCommand),
    /// Write bound secret values into the local secret env file.
    Pull,
    /// Send local values of bound secrets to their vaults.
    Push,
    /// Render the environment's values through a writer.
    Export(ExportArgs),
    /// Show vaults and secret bindings.
    Status {
        /// Structured JSON output.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Check the project file for problems.
    Validate,
    /// List the registered vault types.
    Vaults,
    /// List writers and the formats they take.
    Formats,
}

#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Configure a new vault through its wizard.
    Vault {
        /// Vault type. Asked for when omitted.
        kind: Option<String>,
        /// Binding name. Asked for when omitted.
        #[arg(long)]
        name: Option<String>,
        /// Pre-seeded wizard answer, `key=value`. Repeatable.
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
    /// Choose which secrets of a vault are bound locally.
    Secret {
        /// Vault binding name. Asked for when the project has several.
        vault: Option<String>,
        /// Bind every enabled secret without asking.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemoveCommand {
    Vault { name: String },
    Secret { name: String },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Writer to send output to. Defaults to `output.default_writer`.
    #[arg(long = "to")]
    pub writer: Option<String>,
    /// Output format, or `auto`. Defaults to `output.default_format`.
    #[arg(long = "as")]
    pub format: Option<String>,
}

/// Parses `key=value`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_wizard_args() {
        let cli = Cli::try_parse_from([
            "tether", "-e", "dev", "add", "vault", "keyvault", "--name", "main", "--arg",
            "tenant=contoso", "--arg", "sub=a,b",
        ])
        .unwrap();
        assert_eq!(cli.env.as_deref(), Some("dev"));
        let Commands::Add(AddCommand::Vault { kind, name, args }) = cli.command else {
            panic!("expected add vault");
        };
        assert_eq!(kind.as_deref(), Some("keyvault"));
        assert_eq!(name.as_deref(), Some("main"));
        assert_eq!(
            args,
            vec![
                ("tenant".to_string(), "contoso".to_string()),
                ("sub".to_string(), "a,b".to_string())
            ]
        );
    }

    #[test]
    fn export_flags() {
        let cli = Cli::try_parse_from(["tether", "export", "--to", "github-env", "--as", "auto"]).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.writer.as_deref(), Some("github-env"));
        assert_eq!(args.format.as_deref(), Some("auto"));
    }

    #[test]
    fn verbosity_overrides_level() {
        let cli = Cli::try_parse_from(["tether", "--log-level", "warn", "status"]).unwrap();
        assert_eq!(cli.log_level("info"), "warn");
        let cli = Cli::try_parse_from(["tether", "status", "-vv"]).unwrap();
        assert_eq!(cli.log_level("info"), "trace");
        let cli = Cli::try_parse_from(["tether", "vaults"]).unwrap();
        assert_eq!(cli.log_level("info"), "info");
    }

    #[test]
    fn key_val_requires_separator() {
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
        assert_eq!(parse_key_val("uri=https://a=b").unwrap().1, "https://a=b");
    }
}
