// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource manager and resource graph queries behind the discovery pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tether_core::Result;
use tether_discovery::{DiscoveryItem, DiscoverySource};
use tracing::debug;

use super::http::send_json;
use super::token::TokenProvider;

const MANAGEMENT_API_VERSION: &str = "2022-12-01";
const RESOURCE_GRAPH_API_VERSION: &str = "2021-03-01";

const VAULT_QUERY: &str = "resources \
    | where type =~ 'microsoft.keyvault/vaults' \
    | project name, resourceGroup, subscriptionId, tenantId, location, vaultUri = tostring(properties.vaultUri)";

/// Attribute holding a tenant's type, e.g. `AAD`.
pub const ATTR_TENANT_TYPE: &str = "type";
/// Attribute holding a vault's data-plane URI.
pub const ATTR_VAULT_URI: &str = "uri";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    value: Vec<T>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantDto {
    tenant_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    tenant_type: Option<String>,
    #[serde(default)]
    default_domain: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionDto {
    subscription_id: String,
    display_name: String,
    tenant_id: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Deserialize)]
struct GraphResponse {
    data: Vec<VaultDto>,
    #[serde(rename = "$skipToken", default)]
    skip_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultDto {
    name: String,
    subscription_id: String,
    tenant_id: String,
    #[serde(default)]
    resource_group: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    vault_uri: Option<String>,
}

/// Enumerates tenants, subscriptions and key vaults.
pub struct ManagementClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ManagementClient {
    pub fn new(http: reqwest::Client, endpoint: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn paged<T: serde::de::DeserializeOwned>(
        &self,
        first: String,
        tenant: Option<&str>,
        what: &str,
    ) -> Result<Vec<T>> {
        let token = self.tokens.token(&self.endpoint, tenant).await?;
        let mut out = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let page: Page<T> = send_json(self.http.get(&url), &token, what).await?;
            out.extend(page.value);
            next = page.next_link;
        }
        Ok(out)
    }
}

#[async_trait]
impl DiscoverySource for ManagementClient {
    async fn tenants(&self) -> Result<Vec<DiscoveryItem>> {
        let url = format!("{}/tenants?api-version={MANAGEMENT_API_VERSION}", self.endpoint);
        let tenants: Vec<TenantDto> = self.paged(url, None, "tenants").await?;
        Ok(tenants
            .into_iter()
            .map(|t| {
                let name = t
                    .display_name
                    .or(t.default_domain)
                    .unwrap_or_else(|| t.tenant_id.clone());
                let item = DiscoveryItem::tenant(&t.tenant_id, name);
                match t.tenant_type {
                    Some(kind) => item.with_attribute(ATTR_TENANT_TYPE, kind),
                    None => item,
                }
            })
            .collect())
    }

    async fn subscriptions(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
        let url = format!("{}/subscriptions?api-version={MANAGEMENT_API_VERSION}", self.endpoint);
        let subs: Vec<SubscriptionDto> = self.paged(url, Some(&tenant.id), "subscriptions").await?;
        Ok(subs
            .into_iter()
            // A token for one tenant may still list guest subscriptions of another.
            .filter(|s| s.tenant_id.eq_ignore_ascii_case(&tenant.id))
            .map(|s| {
                let item = DiscoveryItem::subscription(s.subscription_id, s.display_name, &tenant.id);
                match s.state {
                    Some(state) => item.with_attribute("state", state),
                    None => item,
                }
            })
            .collect())
    }

    async fn resources(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
        let url = format!(
            "{}/providers/Microsoft.ResourceGraph/resources?api-version={RESOURCE_GRAPH_API_VERSION}",
            self.endpoint
        );
        let token = self.tokens.token(&self.endpoint, Some(&tenant.id)).await?;
        let mut out = Vec::new();
        let mut skip_token: Option<String> = None;
        loop {
            let mut body = json!({ "query": VAULT_QUERY });
            if let Some(skip) = &skip_token {
                body["options"] = json!({ "$skipToken": skip });
            }
            let page: GraphResponse =
                send_json(self.http.post(&url).json(&body), &token, "key vault query").await?;
            for v in page.data {
                let mut item = DiscoveryItem::resource(&v.name, &v.name, v.tenant_id, v.subscription_id);
                if let Some(uri) = v.vault_uri {
                    item = item.with_attribute(ATTR_VAULT_URI, uri);
                }
                if let Some(rg) = v.resource_group {
                    item = item.with_attribute("resource_group", rg);
                }
                if let Some(location) = v.location {
                    item = item.with_attribute("location", location);
                }
                out.push(item);
            }
            match page.skip_token {
                Some(next) if !next.is_empty() => skip_token = Some(next),
                _ => break,
            }
        }
        debug!(tenant = %tenant.id, count = out.len(), "queried key vaults");
        Ok(out)
    }
}
