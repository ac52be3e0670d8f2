// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backend calls the pipeline fans out over.

use async_trait::async_trait;
use tether_core::Result;

use crate::item::DiscoveryItem;

/// One cloud provider's enumeration endpoints.
///
/// Each method is a single, possibly slow, external call. The pipeline
/// decides how often and how concurrently they run.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Tier 1: every tenant visible to the caller.
    async fn tenants(&self) -> Result<Vec<DiscoveryItem>>;

    /// Tier 2: subscriptions inside one tenant.
    async fn subscriptions(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>>;

    /// Tier 3: every target resource in a tenant, across all of its
    /// subscriptions. Callers filter by subscription themselves.
    async fn resources(&self, tenant: &DiscoveryItem) -> Result<Vec<DiscoveryItem>>;
}
