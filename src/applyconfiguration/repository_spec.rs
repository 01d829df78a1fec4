// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::GitHubRepositoryConfigApplyConfiguration;
use crate::types::{RepositoryType, SyncTargetType};
use serde::{Deserialize, Serialize};

/// Declarative configuration of the [`RepositorySpec`](crate::types::RepositorySpec) type
/// for use with apply.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpecApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_yaml: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOptionsApplyConfiguration>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub repository_type: Option<RepositoryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalRepositoryConfigApplyConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubRepositoryConfigApplyConfiguration>,
}

impl RepositorySpecApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    pub fn with_description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn with_read_only(mut self, value: bool) -> Self {
        self.read_only = Some(value);
        self
    }

    pub fn with_prefer_yaml(mut self, value: bool) -> Self {
        self.prefer_yaml = Some(value);
        self
    }

    pub fn with_sync(mut self, value: SyncOptionsApplyConfiguration) -> Self {
        self.sync = Some(value);
        self
    }

    pub fn with_type(mut self, value: RepositoryType) -> Self {
        self.repository_type = Some(value);
        self
    }

    pub fn with_local(mut self, value: LocalRepositoryConfigApplyConfiguration) -> Self {
        self.local = Some(value);
        self
    }

    pub fn with_github(mut self, value: GitHubRepositoryConfigApplyConfiguration) -> Self {
        self.github = Some(value);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptionsApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<SyncTargetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,
}

impl SyncOptionsApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, value: bool) -> Self {
        self.enabled = Some(value);
        self
    }

    pub fn with_target(mut self, value: SyncTargetType) -> Self {
        self.target = Some(value);
        self
    }

    pub fn with_interval_seconds(mut self, value: i64) -> Self {
        self.interval_seconds = Some(value);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalRepositoryConfigApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl LocalRepositoryConfigApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, value: impl Into<String>) -> Self {
        self.path = Some(value.into());
        self
    }
}
