// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenants -> subscriptions -> resources, fetched concurrently.
//!
//! Tier 1 runs once. As soon as it returns, one tier-2 task per tenant is
//! spawned in the background so the caller can render the tenant list
//! without waiting for subscriptions. Tier 3 runs only for the
//! subscriptions the user selects, one task each, and reads through a cache
//! keyed by tenant: every subscription of one tenant shares a single
//! resource query whose result is filtered client-side.
//!
//! Every backend call holds a semaphore permit, so the number of requests
//! in flight never exceeds the configured limit. A failing tier-2 or tier-3
//! branch is logged and recorded as a [`PartialFailure`]; only a tier-1
//! failure is returned to the caller.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tether_core::{Result, TetherError};
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use crate::cache::ScopeCache;
use crate::item::{DiscoveryItem, PartialFailure, Tier};
use crate::source::DiscoverySource;
use crate::wait_group::WaitGroup;

/// Default bound on concurrent backend calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

struct Shared {
    source: Arc<dyn DiscoverySource>,
    permits: Semaphore,
    cancel: CancellationToken,
    tenants: RwLock<Option<std::result::Result<Vec<DiscoveryItem>, String>>>,
    subscriptions: RwLock<Vec<DiscoveryItem>>,
    resources: ScopeCache<Vec<DiscoveryItem>>,
    failures: Mutex<Vec<PartialFailure>>,
    tier1: WaitGroup,
    tier2: WaitGroup,
}

impl Shared {
    /// Runs one backend call under a permit, racing cancellation.
    async fn call<T, F>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let _permit = tokio::select! {
            _ = self.cancel.cancelled() => return Err(TetherError::Cancelled),
            permit = self.permits.acquire() => permit
                .map_err(|_| TetherError::Internal("discovery semaphore closed".into()))?,
        };
        tokio::select! {
            _ = self.cancel.cancelled() => Err(TetherError::Cancelled),
            res = fut => res,
        }
    }

    async fn record(&self, tier: Tier, scope: &str, err: &TetherError) {
        warn!(%tier, scope, error = %err, "discovery branch failed, continuing without it");
        self.failures.lock().await.push(PartialFailure {
            tier,
            scope: scope.to_string(),
            message: err.to_string(),
        });
    }
}

/// One discovery run. Dropping it cancels any background work.
pub struct DiscoveryPipeline {
    shared: Arc<Shared>,
    started: AtomicBool,
}

impl DiscoveryPipeline {
    pub fn new(source: Arc<dyn DiscoverySource>, max_concurrency: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                permits: Semaphore::new(max_concurrency.max(1)),
                cancel: CancellationToken::new(),
                tenants: RwLock::new(None),
                subscriptions: RwLock::new(Vec::new()),
                resources: ScopeCache::new(),
                failures: Mutex::new(Vec::new()),
                tier1: WaitGroup::new(),
                tier2: WaitGroup::new(),
            }),
            started: AtomicBool::new(false),
        }
    }

    /// Kicks off tiers 1 and 2 in the background. Later calls do nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let shared = self.shared.clone();
        let tier1_guard = shared.tier1.enter();
        // Held until every tier-2 task has been registered.
        let tier2_parent = shared.tier2.enter();

        let tier1 = async move {
            let _tier1 = tier1_guard;
            let _tier2 = tier2_parent;

            let source = shared.source.clone();
            let outcome = shared.call(source.tenants()).await;
            match outcome {
                Ok(mut tenants) => {
                    tenants.sort_by(|a, b| a.display_name.cmp(&b.display_name));
                    info!(count = tenants.len(), "discovered tenants");
                    for tenant in &tenants {
                        let guard = shared.tier2.enter();
                        let shared = shared.clone();
                        let tenant = tenant.clone();
                        tokio::spawn(
                            async move {
                                let _guard = guard;
                                fetch_subscriptions(&shared, &tenant).await;
                            }
                            .in_current_span(),
                        );
                    }
                    *shared.tenants.write().await = Some(Ok(tenants));
                }
                Err(err) => {
                    warn!(error = %err, "tenant discovery failed");
                    *shared.tenants.write().await = Some(Err(err.to_string()));
                }
            }
        };
        tokio::spawn(tier1.in_current_span());
    }

    /// Tier-1 results. Waits for tier 1 only.
    pub async fn tenants(&self) -> Result<Vec<DiscoveryItem>> {
        self.start();
        self.shared.tier1.wait().await;
        self.ensure_live()?;
        match self.shared.tenants.read().await.as_ref() {
            Some(Ok(tenants)) => Ok(tenants.clone()),
            Some(Err(message)) => Err(TetherError::connectivity("discovery", message.clone())),
            None => Err(TetherError::Cancelled),
        }
    }

    /// Tier-2 results, optionally limited to one tenant. Waits for every
    /// tier-2 branch.
    pub async fn subscriptions(&self, tenant_id: Option<&str>) -> Result<Vec<DiscoveryItem>> {
        self.tenants().await?;
        self.shared.tier2.wait().await;
        self.ensure_live()?;
        let mut subs: Vec<DiscoveryItem> = self
            .shared
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|s| tenant_id.is_none() || s.tenant_id.as_deref() == tenant_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        Ok(subs)
    }

    /// Tier-3 results for the selected subscriptions, in selection order.
    ///
    /// One task per distinct selected subscription. Subscriptions sharing a
    /// tenant share one cached backend call.
    pub async fn resources(&self, selected: &[DiscoveryItem]) -> Result<Vec<DiscoveryItem>> {
        let tenants = self.tenants().await?;

        let mut seen = BTreeSet::new();
        let mut tasks = JoinSet::new();
        for (index, sub) in selected.iter().enumerate() {
            if !seen.insert(sub.id.clone()) {
                continue;
            }
            let tenant = sub
                .tenant_id
                .as_deref()
                .and_then(|id| tenants.iter().find(|t| t.id == id))
                .cloned();
            let shared = self.shared.clone();
            let sub = sub.clone();
            tasks.spawn(
                async move {
                    let items = fetch_resources(&shared, tenant, &sub).await;
                    (index, items)
                }
                .in_current_span(),
            );
        }

        let mut batches = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(batch) => batches.push(batch),
                Err(e) => warn!(error = %e, "resource discovery task did not finish"),
            }
        }
        self.ensure_live()?;

        batches.sort_by_key(|(index, _)| *index);
        Ok(batches.into_iter().flat_map(|(_, items)| items).collect())
    }

    /// Branches that failed so far.
    pub async fn failures(&self) -> Vec<PartialFailure> {
        self.shared.failures.lock().await.clone()
    }

    /// Stops background work. Pending and future queries return `Cancelled`.
    pub fn cancel(&self) {
        if !self.shared.cancel.is_cancelled() {
            debug!("cancelling discovery");
            self.shared.cancel.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(TetherError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Drop for DiscoveryPipeline {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

async fn fetch_subscriptions(shared: &Shared, tenant: &DiscoveryItem) {
    let source = shared.source.clone();
    match shared.call(source.subscriptions(tenant)).await {
        Ok(subs) => {
            debug!(tenant = %tenant.id, count = subs.len(), "discovered subscriptions");
            shared.subscriptions.write().await.extend(subs);
        }
        Err(TetherError::Cancelled) => {}
        Err(err) => shared.record(Tier::Subscriptions, &tenant.id, &err).await,
    }
}

async fn fetch_resources(
    shared: &Shared,
    tenant: Option<DiscoveryItem>,
    sub: &DiscoveryItem,
) -> Vec<DiscoveryItem> {
    let Some(tenant) = tenant else {
        let err = TetherError::not_found("tenant", sub.tenant_id.clone().unwrap_or_default());
        shared.record(Tier::Resources, &sub.id, &err).await;
        return Vec::new();
    };

    let source = shared.source.clone();
    let all = shared
        .resources
        .get_or_fetch(&tenant.id, || shared.call(source.resources(&tenant)))
        .await;
    match all {
        Ok(all) => {
            let items: Vec<DiscoveryItem> =
                all.into_iter().filter(|r| r.is_child_of(sub)).collect();
            debug!(subscription = %sub.id, count = items.len(), "discovered resources");
            items
        }
        Err(TetherError::Cancelled) => Vec::new(),
        Err(err) => {
            shared.record(Tier::Resources, &sub.id, &err).await;
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Fake {
        tenant_calls: AtomicUsize,
        sub_calls: AtomicUsize,
        resource_calls: AtomicUsize,
        fail_tenants: bool,
        forbidden_tenants: HashSet<String>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl DiscoverySource for Fake {
        async fn tenants(&self) -> Result<Vec<DiscoveryItem>> {
            self.tenant_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_tenants {
                return Err(TetherError::connectivity("fake", "not logged in"));
            }
            Ok(vec![
                DiscoveryItem::tenant("t2", "Fabrikam"),
                DiscoveryItem::tenant("t1", "Contoso"),
            ])
        }

        async fn subscriptions(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
            self.sub_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.forbidden_tenants.contains(&tenant.id) {
                return Err(TetherError::connectivity("fake", "forbidden"));
            }
            Ok(vec![
                DiscoveryItem::subscription(format!("{}-dev", tenant.id), "Dev", &tenant.id),
                DiscoveryItem::subscription(format!("{}-prod", tenant.id), "Prod", &tenant.id),
            ])
        }

        async fn resources(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
            self.resource_calls.fetch_add(1, Ordering::SeqCst);
            if self.forbidden_tenants.contains(&tenant.id) {
                return Err(TetherError::connectivity("fake", "forbidden"));
            }
            let t = &tenant.id;
            Ok(vec![
                DiscoveryItem::resource("kv-a", "kv-a", t, format!("{t}-dev")),
                DiscoveryItem::resource("kv-b", "kv-b", t, format!("{t}-prod")),
                DiscoveryItem::resource("kv-c", "kv-c", t, format!("{t}-prod")),
            ])
        }
    }

    fn pipeline(fake: Fake) -> (Arc<Fake>, DiscoveryPipeline) {
        let fake = Arc::new(fake);
        let p = DiscoveryPipeline::new(fake.clone(), 4);
        (fake, p)
    }

    #[tokio::test]
    async fn tenants_are_sorted_and_fetched_once() {
        let (fake, p) = pipeline(Fake::default());
        let names: Vec<_> = p.tenants().await.unwrap().into_iter().map(|t| t.display_name).collect();
        assert_eq!(names, vec!["Contoso", "Fabrikam"]);
        p.tenants().await.unwrap();
        assert_eq!(fake.tenant_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn subscriptions_fan_out_per_tenant() {
        let (fake, p) = pipeline(Fake::default());
        let all = p.subscriptions(None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(fake.sub_calls.load(Ordering::SeqCst), 2);

        let t1 = p.subscriptions(Some("t1")).await.unwrap();
        assert!(t1.iter().all(|s| s.tenant_id.as_deref() == Some("t1")));
        assert_eq!(t1.len(), 2);
    }

    #[tokio::test]
    async fn tier_one_failure_propagates() {
        let (_, p) = pipeline(Fake {
            fail_tenants: true,
            ..Fake::default()
        });
        let err = p.tenants().await.unwrap_err();
        assert!(matches!(err, TetherError::Connectivity { .. }));
        assert!(p.subscriptions(None).await.is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn failing_branch_does_not_abort_siblings() {
        let (_, p) = pipeline(Fake {
            forbidden_tenants: HashSet::from(["t2".to_string()]),
            ..Fake::default()
        });
        let subs = p.subscriptions(None).await.unwrap();
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|s| s.tenant_id.as_deref() == Some("t1")));

        let failures = p.failures().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].tier, Tier::Subscriptions);
        assert_eq!(failures[0].scope, "t2");
        assert!(logs_contain("discovery branch failed"));
    }

    #[tokio::test]
    async fn resources_for_siblings_share_one_backend_call() {
        let (fake, p) = pipeline(Fake::default());
        let subs = p.subscriptions(Some("t1")).await.unwrap();

        let dev: Vec<_> = subs.iter().filter(|s| s.id == "t1-dev").cloned().collect();
        let prod: Vec<_> = subs.iter().filter(|s| s.id == "t1-prod").cloned().collect();

        let first = p.resources(&dev).await.unwrap();
        assert_eq!(first.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["kv-a"]);
        let second = p.resources(&prod).await.unwrap();
        assert_eq!(second.len(), 2);
        let both = p.resources(&subs).await.unwrap();
        assert_eq!(both.len(), 3);

        assert_eq!(fake.resource_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resources_keep_selection_order_and_skip_duplicates() {
        let (_, p) = pipeline(Fake::default());
        let subs = p.subscriptions(None).await.unwrap();
        let prod = subs.iter().find(|s| s.id == "t2-prod").cloned().unwrap();
        let dev = subs.iter().find(|s| s.id == "t1-dev").cloned().unwrap();

        let items = p.resources(&[prod.clone(), dev, prod]).await.unwrap();
        let ids: Vec<_> = items
            .iter()
            .map(|r| (r.subscription_id.clone().unwrap(), r.id.clone()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("t2-prod".to_string(), "kv-b".to_string()),
                ("t2-prod".to_string(), "kv-c".to_string()),
                ("t1-dev".to_string(), "kv-a".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn resource_failure_is_partial() {
        let (_, p) = pipeline(Fake {
            forbidden_tenants: HashSet::from(["t2".to_string()]),
            ..Fake::default()
        });
        let orphan = DiscoveryItem::subscription("t2-dev", "Dev", "t2");
        let ok = DiscoveryItem::subscription("t1-dev", "Dev", "t1");
        let items = p.resources(&[orphan, ok]).await.unwrap();
        assert_eq!(items.len(), 1);
        let failures = p.failures().await;
        assert!(failures.iter().any(|f| f.tier == Tier::Resources && f.scope == "t2-dev"));
    }

    #[tokio::test]
    async fn unknown_tenant_is_partial() {
        let (fake, p) = pipeline(Fake::default());
        let stray = DiscoveryItem::subscription("x-dev", "Dev", "nope");
        assert!(p.resources(&[stray]).await.unwrap().is_empty());
        assert_eq!(fake.resource_calls.load(Ordering::SeqCst), 0);
        assert_eq!(p.failures().await.len(), 1);
    }

    #[tokio::test]
    async fn cancel_unblocks_waiters() {
        let (_, p) = pipeline(Fake {
            delay: Some(Duration::from_secs(30)),
            ..Fake::default()
        });
        p.tenants().await.unwrap();
        p.cancel();
        let err = tokio::time::timeout(Duration::from_secs(5), p.subscriptions(None))
            .await
            .expect("cancel should unblock subscriptions")
            .unwrap_err();
        assert!(matches!(err, TetherError::Cancelled));
        assert!(p.failures().await.is_empty());
    }
}
