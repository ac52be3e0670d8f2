// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key vault data plane: list, get and set secrets.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tether_core::types::DEFAULT_CONTENT_TYPE;
use tether_core::{RemoteSecret, Result, SecretContent};

use super::http::send_json;

const DATA_API_VERSION: &str = "7.4";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretList {
    value: Vec<SecretItem>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct Attributes {
    #[serde(default = "enabled_default")]
    enabled: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            enabled: enabled_default(),
        }
    }
}

fn enabled_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretItem {
    id: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    attributes: Option<Attributes>,
}

impl SecretItem {
    /// A secret without attributes is enabled.
    fn into_remote(self) -> RemoteSecret {
        let enabled = self.attributes.unwrap_or_default().enabled;
        RemoteSecret::new(
            secret_name(&self.id),
            self.content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            enabled,
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretBundle {
    value: String,
    #[serde(default)]
    content_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetSecret<'a> {
    value: &'a str,
    content_type: &'a str,
}

/// Last path segment of a secret id (`https://x.vault.azure.net/secrets/<name>`).
fn secret_name(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

/// Client for one vault URI.
pub struct SecretsClient<'a> {
    pub(crate) http: &'a reqwest::Client,
    pub(crate) uri: &'a str,
    pub(crate) token: &'a SecretString,
}

impl SecretsClient<'_> {
    fn base(&self) -> &str {
        self.uri.trim_end_matches('/')
    }

    /// Every secret, following `nextLink` pages, sorted by name.
    pub async fn list(&self) -> Result<Vec<RemoteSecret>> {
        let mut out = Vec::new();
        let mut next = Some(format!("{}/secrets?api-version={DATA_API_VERSION}", self.base()));
        while let Some(url) = next.take() {
            let page: SecretList = send_json(self.http.get(&url), self.token, "secrets").await?;
            out.extend(page.value.into_iter().map(SecretItem::into_remote));
            next = page.next_link.filter(|l| !l.is_empty());
        }
        out.sort_by(|a, b| a.remote_key.cmp(&b.remote_key));
        Ok(out)
    }

    /// Lightweight request used to check access.
    pub async fn check_access(&self) -> Result<()> {
        let url = format!("{}/secrets?api-version={DATA_API_VERSION}&maxresults=1", self.base());
        let _: SecretList = send_json(self.http.get(&url), self.token, "secrets").await?;
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<SecretContent> {
        let url = format!("{}/secrets/{name}?api-version={DATA_API_VERSION}", self.base());
        let bundle: SecretBundle =
            send_json(self.http.get(&url), self.token, &format!("secret {name}")).await?;
        Ok(SecretContent::new(name, bundle.value).with_content_type(
            bundle
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        ))
    }

    pub async fn set(&self, content: &SecretContent) -> Result<()> {
        let name = &content.remote_key;
        let url = format!("{}/secrets/{name}?api-version={DATA_API_VERSION}", self.base());
        let body = SetSecret {
            value: content.expose(),
            content_type: &content.content_type,
        };
        let _: serde_json::Value =
            send_json(self.http.put(&url).json(&body), self.token, &format!("secret {name}")).await?;
        Ok(())
    }
}
