// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Naming rules for environments and local keys.

use serde::{Deserialize, Serialize};
use tether_core::{Result, TetherError};

/// Substrings an environment name may not contain.
const RESERVED_ENV_FRAGMENTS: &[&str] = &[".", "..", ".git", "tether", "env", ".env.secret", "/", "\\"];

/// Per-project name normalization, stored in the `[options]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectOptions {
    /// `my-secret` becomes `my_secret` locally.
    #[serde(default = "default_true")]
    pub hyphens_to_underscores: bool,

    /// `my_secret` becomes `MY_SECRET` locally.
    #[serde(default = "default_true")]
    pub uppercase_locally: bool,

    /// Pulled secrets go to `.env.secret.{env}` instead of `.env.{env}`.
    #[serde(default = "default_true")]
    pub use_dot_secret_file_for_secrets: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            hyphens_to_underscores: true,
            uppercase_locally: true,
            use_dot_secret_file_for_secrets: true,
        }
    }
}

/// Label and help text for one option, used by the init form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionHelp {
    pub key: &'static str,
    pub label: &'static str,
    pub summary: &'static str,
    pub value: bool,
}

impl ProjectOptions {
    /// Applies the configured normalization to a remote or typed name.
    pub fn convert(&self, name: &str) -> String {
        let mut out = name.trim().to_string();
        if self.uppercase_locally {
            out = out.to_uppercase();
        }
        if self.hyphens_to_underscores {
            out = out.replace('-', "_");
        }
        out
    }

    /// Describes every option with its current value.
    pub fn help(&self) -> [OptionHelp; 3] {
        [
            OptionHelp {
                key: "hyphens_to_underscores",
                label: "underscore locally",
                summary: "Convert hyphens to underscores when binding secrets (my-secret -> my_secret)",
                value: self.hyphens_to_underscores,
            },
            OptionHelp {
                key: "uppercase_locally",
                label: "uppercase locally",
                summary: "Uppercase local names when binding secrets (my-secret -> MY-SECRET)",
                value: self.uppercase_locally,
            },
            OptionHelp {
                key: "use_dot_secret_file_for_secrets",
                label: "use .env.secret files",
                summary: "Store pulled secrets in .env.secret.<env> so they are easy to gitignore",
                value: self.use_dot_secret_file_for_secrets,
            },
        ]
    }

    /// Sets an option by its key.
    pub fn set(&mut self, key: &str, value: bool) -> Result<()> {
        match key {
            "hyphens_to_underscores" => self.hyphens_to_underscores = value,
            "uppercase_locally" => self.uppercase_locally = value,
            "use_dot_secret_file_for_secrets" => self.use_dot_secret_file_for_secrets = value,
            other => return Err(TetherError::not_found("option", other)),
        }
        Ok(())
    }
}

/// Rejects environment names that would collide with tether's own files.
pub fn validate_env_name(env: &str) -> Result<()> {
    if let Some(bad) = RESERVED_ENV_FRAGMENTS.iter().find(|f| env.contains(*f)) {
        return Err(TetherError::Validation(format!(
            "environment name '{env}' cannot contain '{bad}'"
        )));
    }
    Ok(())
}

/// Whether `name` is usable as a POSIX environment variable.
pub fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn convert_with_all_flags() {
        let opts = ProjectOptions::default();
        assert_eq!(opts.convert("my-secret"), "MY_SECRET");
    }

    #[test]
    fn convert_respects_disabled_flags() {
        let opts = ProjectOptions {
            hyphens_to_underscores: false,
            uppercase_locally: true,
            use_dot_secret_file_for_secrets: true,
        };
        assert_eq!(opts.convert("my-secret"), "MY-SECRET");

        let opts = ProjectOptions {
            hyphens_to_underscores: true,
            uppercase_locally: false,
            use_dot_secret_file_for_secrets: true,
        };
        assert_eq!(opts.convert("my-secret"), "my_secret");
    }

    #[test]
    fn env_names() {
        assert!(validate_env_name("").is_ok());
        assert!(validate_env_name("dev").is_ok());
        assert!(validate_env_name("prod-eu").is_ok());
        for bad in ["a.b", "..", ".git", "mytether", "environment", "a/b"] {
            assert!(validate_env_name(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn env_var_shape() {
        assert!(is_env_var_name("MY_KEY"));
        assert!(is_env_var_name("_private"));
        assert!(!is_env_var_name("1KEY"));
        assert!(!is_env_var_name("MY-KEY"));
        assert!(!is_env_var_name(""));
    }

    #[test]
    fn set_by_key() {
        let mut opts = ProjectOptions::default();
        opts.set("uppercase_locally", false).unwrap();
        assert!(!opts.uppercase_locally);
        assert!(opts.set("lowercase", true).is_err());
    }

    #[test]
    fn options_toml_rejects_unknown_keys() {
        assert!(toml::from_str::<ProjectOptions>("uppercase = true").is_err());
        let opts: ProjectOptions = toml::from_str("uppercase_locally = false").unwrap();
        assert!(!opts.uppercase_locally);
        assert!(opts.hyphens_to_underscores);
    }

    proptest! {
        #[test]
        fn converted_names_are_stable(name in "[a-z][a-z0-9-]{0,20}") {
            let opts = ProjectOptions::default();
            let once = opts.convert(&name);
            prop_assert_eq!(opts.convert(&once), once.clone());
            prop_assert!(is_env_var_name(&once));
        }
    }
}
