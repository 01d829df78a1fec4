// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::SyncStatusApplyConfiguration;
use serde::{Deserialize, Serialize};

/// Declarative configuration of the [`RepositoryStatus`](crate::types::RepositoryStatus) type
/// for use with apply.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatusApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatusApplyConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatusApplyConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<ResourceCountApplyConfiguration>,
}

impl RepositoryStatusApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observed_generation(mut self, value: i64) -> Self {
        self.observed_generation = Some(value);
        self
    }

    pub fn with_health(mut self, value: HealthStatusApplyConfiguration) -> Self {
        self.health = Some(value);
        self
    }

    pub fn with_sync(mut self, value: SyncStatusApplyConfiguration) -> Self {
        self.sync = Some(value);
        self
    }

    /// Appends to the stats list.
    pub fn with_stats<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = ResourceCountApplyConfiguration>,
    {
        self.stats.extend(values);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HealthStatusApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message: Vec<String>,
}

impl HealthStatusApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_healthy(mut self, value: bool) -> Self {
        self.healthy = Some(value);
        self
    }

    pub fn with_checked(mut self, value: i64) -> Self {
        self.checked = Some(value);
        self
    }

    pub fn with_message<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.extend(values.into_iter().map(Into::into));
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceCountApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl ResourceCountApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, value: impl Into<String>) -> Self {
        self.group = Some(value.into());
        self
    }

    pub fn with_resource(mut self, value: impl Into<String>) -> Self {
        self.resource = Some(value.into());
        self
    }

    pub fn with_count(mut self, value: i64) -> Self {
        self.count = Some(value);
        self
    }
}
