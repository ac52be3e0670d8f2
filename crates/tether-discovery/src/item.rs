// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nodes of the tenant -> subscription -> resource tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tether_core::TetherError;

/// Which level of the hierarchy an item belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
    Tenant,
    Subscription,
    Resource,
}

/// One discovered node. Parent links are used to filter children by a
/// selected parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryItem {
    pub id: String,
    pub display_name: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Backend-specific extras such as a vault URI or a tenant type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl DiscoveryItem {
    pub fn tenant(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            tenant_id: Some(id.clone()),
            id,
            display_name: display_name.into(),
            kind: ItemKind::Tenant,
            subscription_id: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn subscription(
        id: impl Into<String>,
        display_name: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            subscription_id: Some(id.clone()),
            id,
            display_name: display_name.into(),
            kind: ItemKind::Subscription,
            tenant_id: Some(tenant_id.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn resource(
        id: impl Into<String>,
        display_name: impl Into<String>,
        tenant_id: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: ItemKind::Resource,
            tenant_id: Some(tenant_id.into()),
            subscription_id: Some(subscription_id.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether this item sits directly under `parent`.
    pub fn is_child_of(&self, parent: &DiscoveryItem) -> bool {
        match parent.kind {
            ItemKind::Tenant => {
                self.kind == ItemKind::Subscription && self.tenant_id.as_deref() == Some(&parent.id)
            }
            ItemKind::Subscription => {
                self.kind == ItemKind::Resource
                    && self.subscription_id.as_deref() == Some(&parent.id)
            }
            ItemKind::Resource => false,
        }
    }

    /// Case-insensitive match on id or display name.
    pub fn matches(&self, needle: &str) -> bool {
        self.id.eq_ignore_ascii_case(needle) || self.display_name.eq_ignore_ascii_case(needle)
    }
}

impl fmt::Display for DiscoveryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// Pipeline tier a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Tenants,
    Subscriptions,
    Resources,
}

/// A branch that failed and contributed no items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    pub tier: Tier,
    /// Id of the parent scope the branch was enumerating.
    pub scope: String,
    pub message: String,
}

impl PartialFailure {
    pub fn to_error(&self) -> TetherError {
        TetherError::PartialEnumeration {
            scope: format!("{}:{}", self.tier, self.scope),
            message: self.message.clone(),
        }
    }
}
