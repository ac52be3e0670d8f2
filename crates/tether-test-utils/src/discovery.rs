// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery source with a fixed tree and per-tier call counters.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tether_core::{Result, TetherError};
use tether_discovery::{DiscoveryItem, DiscoverySource};

/// A fixed tenant/subscription/resource tree.
///
/// Every tenant `tN` holds subscriptions `tN-dev` and `tN-prod`; every
/// subscription holds one vault `kv-<sub>` plus `kv-<sub>-2` for prod.
/// Calls can be slowed down or made to fail per tenant.
#[derive(Debug)]
pub struct CountingDiscoverySource {
    tenants: Vec<DiscoveryItem>,
    forbidden: HashSet<String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    tenant_calls: AtomicUsize,
    subscription_calls: AtomicUsize,
    resource_calls: AtomicUsize,
}

impl CountingDiscoverySource {
    /// `count` tenants named `t1`..`tN`.
    pub fn with_tenants(count: usize) -> Self {
        Self {
            tenants: (1..=count)
                .map(|i| DiscoveryItem::tenant(format!("t{i}"), format!("Tenant {i}")))
                .collect(),
            forbidden: HashSet::new(),
            delay: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            tenant_calls: AtomicUsize::new(0),
            subscription_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
        }
    }

    /// Tier-2 and tier-3 calls for `tenant` fail with a connectivity error.
    pub fn forbid(mut self, tenant: &str) -> Self {
        self.forbidden.insert(tenant.to_string());
        self
    }

    /// Every call sleeps this long before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn tenant_calls(&self) -> usize {
        self.tenant_calls.load(Ordering::SeqCst)
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn enter(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn check(&self, tenant: &DiscoveryItem) -> Result<()> {
        if self.forbidden.contains(&tenant.id) {
            return Err(TetherError::connectivity(
                "counting",
                format!("forbidden in {}", tenant.id),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DiscoverySource for CountingDiscoverySource {
    async fn tenants(&self) -> Result<Vec<DiscoveryItem>> {
        self.enter(&self.tenant_calls).await;
        self.leave();
        Ok(self.tenants.clone())
    }

    async fn subscriptions(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
        self.enter(&self.subscription_calls).await;
        self.leave();
        self.check(tenant)?;
        let t = &tenant.id;
        Ok(vec![
            DiscoveryItem::subscription(format!("{t}-dev"), format!("{t} Dev"), t),
            DiscoveryItem::subscription(format!("{t}-prod"), format!("{t} Prod"), t),
        ])
    }

    async fn resources(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>> {
        self.enter(&self.resource_calls).await;
        self.leave();
        self.check(tenant)?;
        let t = &tenant.id;
        Ok(vec![
            vault(t, &format!("{t}-dev"), ""),
            vault(t, &format!("{t}-prod"), ""),
            vault(t, &format!("{t}-prod"), "-2"),
        ])
    }
}

fn vault(tenant: &str, sub: &str, suffix: &str) -> DiscoveryItem {
    let name = format!("kv-{sub}{suffix}");
    DiscoveryItem::resource(&name, &name, tenant, sub)
        .with_attribute("uri", format!("https://{name}.vault.azure.net/"))
}
