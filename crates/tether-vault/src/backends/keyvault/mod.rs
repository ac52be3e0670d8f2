// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Azure Key Vault backend.
//!
//! The wizard walks tenant, subscriptions, then vault, fed by a
//! [`DiscoveryPipeline`] over the resource manager APIs. Once bound, only
//! the vault URI (and the tenant used to get tokens) is persisted.

mod http;
mod management;
mod secrets;
mod token;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tether_config::TetherConfig;
use tether_core::{
    ConfigBlob, FormAnswers, FormField, FormOption, FormSpec, RemoteSecret, Result, SecretContent,
    TetherError, Vault, WizardArgs, WizardMachine, WizardState,
};
use tether_discovery::{DiscoveryItem, DiscoveryPipeline};
use tether_security::{build_secure_client, validate_url};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub use management::{ATTR_TENANT_TYPE, ATTR_VAULT_URI, ManagementClient};
pub use token::{AzCliTokenProvider, StaticTokenProvider, TokenProvider};

use super::{blob_opt_string, blob_string, check_blob_type};
use crate::wizard::{list_answer, take_arg, text_answer, warn_unused_args};
use secrets::SecretsClient;

pub const KIND: &str = "keyvault";

/// Endpoints and limits for the backend.
#[derive(Debug, Clone)]
pub struct KeyVaultSettings {
    pub management_endpoint: String,
    pub vault_resource: String,
    pub cli_path: String,
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl KeyVaultSettings {
    pub fn from_config(config: &TetherConfig) -> Self {
        Self {
            management_endpoint: config.keyvault.management_endpoint.clone(),
            vault_resource: config.keyvault.vault_resource.clone(),
            cli_path: config.keyvault.cli_path.clone(),
            timeout: Duration::from_secs(config.discovery.http_timeout_secs),
            max_concurrency: config.discovery.max_concurrency,
        }
    }
}

impl Default for KeyVaultSettings {
    fn default() -> Self {
        Self::from_config(&TetherConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Tenant,
    Subscriptions,
    Vault,
}

/// Answers collected so far, plus pre-seeds not yet resolved.
#[derive(Debug, Default)]
struct Draft {
    seed_tenant: Option<String>,
    seed_subscriptions: Option<String>,
    tenant: Option<String>,
    subscriptions: Option<Vec<DiscoveryItem>>,
    uri: Option<String>,
}

/// Vault bound to one Key Vault URI.
pub struct KeyVault {
    settings: KeyVaultSettings,
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    tenant: Option<String>,
    uri: Option<String>,
    data_token: OnceCell<SecretString>,
    pipeline: Option<DiscoveryPipeline>,
    wizard: WizardMachine<Step>,
    draft: Draft,
    form: Option<FormSpec>,
}

impl KeyVault {
    /// Backend that gets tokens from the Azure CLI.
    pub fn new(settings: KeyVaultSettings) -> Result<Self> {
        let tokens = Arc::new(AzCliTokenProvider::new(&settings.cli_path));
        Self::with_tokens(settings, tokens)
    }

    pub fn with_tokens(settings: KeyVaultSettings, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = build_secure_client(settings.timeout)?;
        Ok(Self {
            settings,
            http,
            tokens,
            tenant: None,
            uri: None,
            data_token: OnceCell::new(),
            pipeline: None,
            wizard: WizardMachine::new(),
            draft: Draft::default(),
            form: None,
        })
    }

    fn uri(&self) -> Result<&str> {
        self.uri
            .as_deref()
            .ok_or_else(|| TetherError::Validation("keyvault has no vault URI configured".into()))
    }

    /// Data-plane token, fetched once per binding.
    async fn token(&self) -> Result<&SecretString> {
        self.data_token
            .get_or_try_init(|| {
                debug!(tenant = self.tenant.as_deref().unwrap_or("<home>"), "acquiring data-plane token");
                self.tokens.token(&self.settings.vault_resource, self.tenant.as_deref())
            })
            .await
    }

    async fn client(&self) -> Result<SecretsClient<'_>> {
        let uri = self.uri()?;
        let token = self.token().await?;
        Ok(SecretsClient {
            http: &self.http,
            uri,
            token,
        })
    }

    fn pipeline(&mut self) -> Result<&DiscoveryPipeline> {
        if self.pipeline.is_none() {
            validate_url(&self.settings.management_endpoint)?;
            let source = ManagementClient::new(
                self.http.clone(),
                &self.settings.management_endpoint,
                self.tokens.clone(),
            );
            let pipeline = DiscoveryPipeline::new(Arc::new(source), self.settings.max_concurrency);
            pipeline.start();
            self.pipeline = Some(pipeline);
        }
        self.pipeline
            .as_ref()
            .ok_or_else(|| TetherError::Internal("discovery pipeline missing".into()))
    }

    fn drop_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.cancel();
        }
    }

    /// Resolves pre-seeds and returns the first step still needing input.
    async fn next_step(&mut self) -> Result<Option<(Step, FormSpec)>> {
        if self.draft.uri.is_some() {
            return Ok(None);
        }

        if self.draft.tenant.is_none() {
            let tenants = self.pipeline()?.tenants().await?;
            if tenants.is_empty() {
                return Err(TetherError::Validation(
                    "no tenants are visible to the signed-in account".into(),
                ));
            }
            if let Some(seed) = self.draft.seed_tenant.take() {
                match tenants.iter().find(|t| t.matches(&seed)) {
                    Some(tenant) => self.draft.tenant = Some(tenant.id.clone()),
                    None => warn!(tenant = %seed, "pre-seeded tenant not found, asking instead"),
                }
            }
            if self.draft.tenant.is_none() {
                return Ok(Some((Step::Tenant, tenant_form(&tenants))));
            }
        }

        if self.draft.subscriptions.is_none() {
            let tenant = self.draft.tenant.clone().unwrap_or_default();
            let pipeline = self.pipeline()?;
            let subs = pipeline.subscriptions(Some(&tenant)).await?;
            let failed = pipeline
                .failures()
                .await
                .iter()
                .any(|f| f.scope == tenant);
            if subs.is_empty() {
                return Err(TetherError::Validation(format!(
                    "no subscriptions found in tenant '{tenant}'"
                )));
            }
            if let Some(seed) = self.draft.seed_subscriptions.take() {
                let picked: Vec<DiscoveryItem> = seed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .filter_map(|needle| {
                        let found = subs.iter().find(|s| s.matches(needle)).cloned();
                        if found.is_none() {
                            warn!(subscription = %needle, "pre-seeded subscription not found");
                        }
                        found
                    })
                    .collect();
                if !picked.is_empty() {
                    self.draft.subscriptions = Some(picked);
                }
            }
            if self.draft.subscriptions.is_none() {
                return Ok(Some((Step::Subscriptions, subscription_form(&subs, failed))));
            }
        }

        let selected = self.draft.subscriptions.clone().unwrap_or_default();
        let vaults = self.pipeline()?.resources(&selected).await?;
        let options: Vec<FormOption> = vaults
            .iter()
            .filter_map(|v| {
                let uri = v.attribute(ATTR_VAULT_URI)?;
                let label = match v.attribute("resource_group") {
                    Some(rg) => format!("{} ({rg})", v.display_name),
                    None => v.display_name.clone(),
                };
                Some(FormOption::new(label, uri))
            })
            .collect();
        if options.is_empty() {
            return Err(TetherError::Validation(
                "no key vaults found in the selected subscriptions".into(),
            ));
        }
        Ok(Some((
            Step::Vault,
            FormSpec::new("vault", "Key Vault")
                .field(FormField::select("vault", "Vault", options).describe("Vault to bind")),
        )))
    }
}

fn tenant_form(tenants: &[DiscoveryItem]) -> FormSpec {
    let options = tenants
        .iter()
        .map(|t| {
            let label = match t.attribute(ATTR_TENANT_TYPE) {
                Some(kind) => format!("({kind}) {}", t.display_name),
                None => t.display_name.clone(),
            };
            FormOption::new(label, &t.id)
        })
        .collect();
    FormSpec::new("tenant", "Azure tenant").field(FormField::select("tenant", "Tenant", options))
}

fn subscription_form(subs: &[DiscoveryItem], partial: bool) -> FormSpec {
    let options = subs
        .iter()
        .map(|s| FormOption::new(s.to_string(), &s.id))
        .collect();
    let mut form = FormSpec::new("subscriptions", "Subscriptions");
    if partial {
        form = form.describe("Some subscriptions could not be listed and are not shown");
    }
    form.field(
        FormField::multi_select("subscriptions", "Subscriptions to search", options)
            .describe("Key vaults are searched in every selected subscription"),
    )
}

#[async_trait]
impl Vault for KeyVault {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn display_name(&self) -> &'static str {
        "Azure Key Vault"
    }

    fn describe(&self) -> String {
        format!("{KIND}: {}", self.uri.as_deref().unwrap_or("<unset>"))
    }

    async fn warmup(&mut self) -> Result<()> {
        validate_url(self.uri()?)?;
        self.client().await?.check_access().await?;
        info!(uri = self.uri.as_deref().unwrap_or_default(), "key vault reachable");
        Ok(())
    }

    async fn list_elevate(&self) -> Result<()> {
        self.token().await.map(|_| ())
    }

    async fn push_elevate(&self) -> Result<()> {
        self.token().await.map(|_| ())
    }

    async fn pull_elevate(&self) -> Result<()> {
        self.token().await.map(|_| ())
    }

    async fn list(&self) -> Result<Vec<RemoteSecret>> {
        self.client().await?.list().await
    }

    async fn pull(&self, secret: &RemoteSecret) -> Result<SecretContent> {
        if !secret.enabled {
            return Err(TetherError::Validation(format!(
                "secret '{}' is disabled",
                secret.remote_key
            )));
        }
        self.client().await?.get(&secret.remote_key).await
    }

    async fn push(&self, content: &SecretContent) -> Result<()> {
        debug!(key = %content.remote_key, "storing secret in key vault");
        self.client().await?.set(content).await
    }

    fn marshal(&self) -> ConfigBlob {
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        if let Some(tenant) = &self.tenant {
            blob.insert("tenant".into(), tenant.as_str().into());
        }
        if let Some(uri) = &self.uri {
            blob.insert("uri".into(), uri.as_str().into());
        }
        blob
    }

    fn unmarshal(&mut self, blob: &ConfigBlob) -> Result<()> {
        check_blob_type(blob, KIND)?;
        let uri = blob_string(blob, KIND, "uri")?;
        validate_url(&uri)?;
        self.uri = Some(uri);
        self.tenant = blob_opt_string(blob, "tenant");
        self.data_token = OnceCell::new();
        Ok(())
    }

    async fn wiz_warmup(&mut self, args: &WizardArgs) -> Result<()> {
        self.wizard.begin()?;
        self.form = None;
        let mut args = args.clone();
        self.draft = Draft {
            seed_tenant: take_arg(&mut args, &["tenant", "t"]),
            seed_subscriptions: take_arg(&mut args, &["subscription", "sub"]),
            uri: take_arg(&mut args, &["uri", "vault"]),
            ..Draft::default()
        };
        warn_unused_args(KIND, &args);
        if let Some(uri) = &self.draft.uri {
            validate_url(uri)?;
            self.draft.tenant = self.draft.seed_tenant.take();
        } else {
            // Tenants start loading while the first form renders.
            self.pipeline()?;
        }
        Ok(())
    }

    async fn wiz_next(&mut self) -> Result<Option<FormSpec>> {
        if self.wizard.state() != WizardState::Collecting {
            self.wizard.advance(None)?;
            return Ok(None);
        }
        if let (Some(step), Some(form)) = (self.wizard.pending(), &self.form) {
            let form = form.clone();
            self.wizard.advance(Some(step))?;
            return Ok(Some(form));
        }
        match self.next_step().await? {
            Some((step, form)) => {
                self.wizard.advance(Some(step))?;
                self.form = Some(form.clone());
                Ok(Some(form))
            }
            None => {
                self.wizard.advance(None)?;
                self.form = None;
                Ok(None)
            }
        }
    }

    async fn wiz_submit(&mut self, answers: &FormAnswers) -> Result<()> {
        let step = self.wizard.expecting()?;
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| TetherError::Validation("no wizard form is waiting for answers".into()))?;
        form.validate(answers)?;
        match step {
            Step::Tenant => self.draft.tenant = Some(text_answer(answers, "tenant")?),
            Step::Subscriptions => {
                let ids = list_answer(answers, "subscriptions")?;
                if ids.is_empty() {
                    return Err(TetherError::Validation("select at least one subscription".into()));
                }
                let tenant = self.draft.tenant.clone();
                let subs = self.pipeline()?.subscriptions(tenant.as_deref()).await?;
                self.draft.subscriptions = Some(
                    subs.into_iter()
                        .filter(|s| ids.contains(&s.id))
                        .collect(),
                );
            }
            Step::Vault => self.draft.uri = Some(text_answer(answers, "vault")?),
        }
        self.form = None;
        self.wizard.answered();
        Ok(())
    }

    async fn wiz_complete(&mut self) -> Result<()> {
        if self.wizard.state() != WizardState::Complete {
            return Err(TetherError::Validation("wizard has unanswered steps".into()));
        }
        self.drop_pipeline();
        let uri = std::mem::replace(&mut self.uri, self.draft.uri.take());
        let tenant = std::mem::replace(&mut self.tenant, self.draft.tenant.take());
        let token = std::mem::take(&mut self.data_token);
        if let Err(err) = self.warmup().await {
            self.uri = uri;
            self.tenant = tenant;
            self.data_token = token;
            self.wiz_abort();
            return Err(err);
        }
        self.wizard.finish()
    }

    fn wiz_abort(&mut self) {
        self.drop_pipeline();
        self.draft = Draft::default();
        self.form = None;
        self.wizard.abort();
    }

    fn wizard_state(&self) -> WizardState {
        self.wizard.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_core::Answer;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> KeyVaultSettings {
        KeyVaultSettings {
            management_endpoint: server.uri(),
            vault_resource: "https://vault.azure.net".into(),
            cli_path: "az".into(),
            timeout: Duration::from_secs(5),
            max_concurrency: 4,
        }
    }

    fn vault(server: &MockServer) -> KeyVault {
        KeyVault::with_tokens(settings(server), Arc::new(StaticTokenProvider::new("test-token"))).unwrap()
    }

    fn bound(server: &MockServer) -> KeyVault {
        let mut v = vault(server);
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        blob.insert("uri".into(), server.uri().into());
        v.unmarshal(&blob).unwrap();
        v
    }

    async fn mount_management(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"tenantId": "t1", "displayName": "Contoso", "tenantType": "AAD"},
                    {"tenantId": "t2", "displayName": "Fabrikam"}
                ]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"subscriptionId": "s1", "displayName": "Prod", "tenantId": "t1"},
                    {"subscriptionId": "s2", "displayName": "Dev", "tenantId": "t1"},
                    {"subscriptionId": "s9", "displayName": "Guest", "tenantId": "t2"}
                ]
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/providers/Microsoft.ResourceGraph/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"name": "kv-prod", "subscriptionId": "s1", "tenantId": "t1",
                     "resourceGroup": "rg-prod", "vaultUri": server.uri()},
                    {"name": "kv-dev", "subscriptionId": "s2", "tenantId": "t1",
                     "vaultUri": "https://kv-dev.vault.azure.net/"}
                ]
            })))
            .mount(server)
            .await;
    }

    async fn mount_secrets(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/secrets"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": format!("{}/secrets/zeta", server.uri()), "attributes": {"enabled": true}},
                    {"id": format!("{}/secrets/alpha", server.uri()),
                     "contentType": "application/json", "attributes": {"enabled": false}}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn list_reads_names_and_attributes() {
        let server = MockServer::start().await;
        mount_secrets(&server).await;
        let v = bound(&server);
        let listed = v.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].remote_key, "alpha");
        assert_eq!(listed[0].content_type, "application/json");
        assert!(!listed[0].enabled);
        assert_eq!(listed[1].remote_key, "zeta");
        assert_eq!(listed[1].content_type, "text/plain");
    }

    #[tokio::test]
    async fn pull_and_push_round_trip_through_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/secrets/db-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": "hunter2", "contentType": "text/plain"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/secrets/api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "x"})))
            .expect(1)
            .mount(&server)
            .await;

        let v = bound(&server);
        let pulled = v
            .pull(&RemoteSecret::new("db-password", "text/plain", true))
            .await
            .unwrap();
        assert_eq!(pulled.expose(), "hunter2");
        v.push(&SecretContent::new("api-key", "x")).await.unwrap();
    }

    #[tokio::test]
    async fn missing_secret_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/secrets/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "SecretNotFound", "message": "missing"}
            })))
            .mount(&server)
            .await;
        let v = bound(&server);
        let err = v
            .pull(&RemoteSecret::new("nope", "text/plain", true))
            .await
            .unwrap_err();
        assert!(matches!(err, TetherError::NotFound { .. }));
    }

    #[tokio::test]
    async fn forbidden_is_connectivity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/secrets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "Forbidden", "message": "no list permission"}
            })))
            .mount(&server)
            .await;
        let err = bound(&server).list().await.unwrap_err();
        assert!(matches!(err, TetherError::Connectivity { .. }));
        assert!(err.to_string().contains("no list permission"));
    }

    #[test]
    fn unmarshal_requires_secure_uri() {
        let mut v = KeyVault::with_tokens(
            KeyVaultSettings::default(),
            Arc::new(StaticTokenProvider::new("t")),
        )
        .unwrap();
        let mut blob = ConfigBlob::new();
        blob.insert("type".into(), KIND.into());
        assert!(v.unmarshal(&blob).unwrap_err().is_validation());

        blob.insert("uri".into(), "http://kv.example.com".into());
        assert!(v.unmarshal(&blob).unwrap_err().is_validation());

        blob.insert("uri".into(), "https://kv.vault.azure.net/".into());
        blob.insert("tenant".into(), "t1".into());
        v.unmarshal(&blob).unwrap();
        assert_eq!(v.marshal(), blob);
    }

    #[tokio::test]
    async fn wizard_walks_tenant_subscriptions_vault() {
        let server = MockServer::start().await;
        mount_management(&server).await;
        mount_secrets(&server).await;

        let mut v = vault(&server);
        v.wiz_warmup(&WizardArgs::new()).await.unwrap();

        let tenant = v.wiz_next().await.unwrap().unwrap();
        assert_eq!(tenant.id, "tenant");
        let tether_core::FieldKind::Select { options } = &tenant.fields[0].kind else {
            panic!("tenant step should be a select");
        };
        assert_eq!(options[0].label, "(AAD) Contoso");
        let mut answers = FormAnswers::new();
        answers.insert("tenant".into(), Answer::from("t1"));
        v.wiz_submit(&answers).await.unwrap();

        let subs = v.wiz_next().await.unwrap().unwrap();
        assert_eq!(subs.id, "subscriptions");
        let tether_core::FieldKind::MultiSelect { options } = &subs.fields[0].kind else {
            panic!("subscription step should be a multi-select");
        };
        let ids: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        let mut answers = FormAnswers::new();
        answers.insert("subscriptions".into(), Answer::from(vec!["s1".to_string()]));
        v.wiz_submit(&answers).await.unwrap();

        let vaults = v.wiz_next().await.unwrap().unwrap();
        let tether_core::FieldKind::Select { options } = &vaults.fields[0].kind else {
            panic!("vault step should be a select");
        };
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "kv-prod (rg-prod)");
        let mut answers = FormAnswers::new();
        answers.insert("vault".into(), Answer::from(server.uri()));
        v.wiz_submit(&answers).await.unwrap();

        assert!(v.wiz_next().await.unwrap().is_none());
        v.wiz_complete().await.unwrap();
        assert_eq!(v.wizard_state(), WizardState::Ready);
        assert_eq!(v.marshal().get("tenant").and_then(|t| t.as_str()), Some("t1"));
    }

    #[tokio::test]
    async fn preseeded_uri_skips_discovery() {
        let server = MockServer::start().await;
        mount_secrets(&server).await;

        let mut v = vault(&server);
        let mut args = WizardArgs::new();
        args.insert("uri".into(), server.uri());
        v.wiz_warmup(&args).await.unwrap();
        assert!(v.wiz_next().await.unwrap().is_none());
        v.wiz_complete().await.unwrap();
        assert_eq!(v.describe(), format!("keyvault: {}", server.uri()));
    }

    #[tokio::test]
    async fn failed_completion_keeps_previous_vault() {
        let server = MockServer::start().await;
        let unreachable = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/secrets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "Forbidden", "message": "no list permission"}
            })))
            .mount(&unreachable)
            .await;

        let mut v = bound(&server);
        let mut args = WizardArgs::new();
        args.insert("uri".into(), unreachable.uri());
        v.wiz_warmup(&args).await.unwrap();
        assert!(v.wiz_next().await.unwrap().is_none());

        assert!(v.wiz_complete().await.is_err());
        assert_eq!(v.wizard_state(), WizardState::Cold);
        assert_eq!(v.describe(), format!("keyvault: {}", server.uri()));
        assert_eq!(
            v.marshal().get("uri").and_then(|u| u.as_str()),
            Some(server.uri().as_str())
        );
    }

    #[tokio::test]
    async fn preseeded_tenant_matches_by_name() {
        let server = MockServer::start().await;
        mount_management(&server).await;

        let mut v = vault(&server);
        let mut args = WizardArgs::new();
        args.insert("tenant".into(), "contoso".into());
        args.insert("sub".into(), "Prod".into());
        v.wiz_warmup(&args).await.unwrap();
        let form = v.wiz_next().await.unwrap().unwrap();
        assert_eq!(form.id, "vault");
        v.wiz_abort();
        assert_eq!(v.wizard_state(), WizardState::Cold);
    }

    #[tokio::test]
    async fn empty_subscription_answer_is_rejected() {
        let server = MockServer::start().await;
        mount_management(&server).await;

        let mut v = vault(&server);
        let mut args = WizardArgs::new();
        args.insert("tenant".into(), "t1".into());
        v.wiz_warmup(&args).await.unwrap();
        assert_eq!(v.wiz_next().await.unwrap().unwrap().id, "subscriptions");
        let mut answers = FormAnswers::new();
        answers.insert("subscriptions".into(), Answer::from(Vec::<String>::new()));
        assert!(v.wiz_submit(&answers).await.unwrap_err().is_validation());
        assert_eq!(v.wiz_next().await.unwrap().unwrap().id, "subscriptions");
    }
}
