// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical cloud resource discovery for tether.
//!
//! A cloud-backed vault implements [`DiscoverySource`] for its provider and
//! drives a [`DiscoveryPipeline`] from its setup wizard: the tenant list is
//! available as soon as tier 1 returns, subscriptions load in the
//! background, and resources are fetched only for the subscriptions the
//! user picks.

pub mod cache;
pub mod item;
pub mod pipeline;
pub mod source;
pub mod wait_group;

pub use cache::ScopeCache;
pub use item::{DiscoveryItem, ItemKind, PartialFailure, Tier};
pub use pipeline::{DEFAULT_MAX_CONCURRENCY, DiscoveryPipeline};
pub use source::DiscoverySource;
pub use wait_group::{WaitGroup, WaitGuard};
