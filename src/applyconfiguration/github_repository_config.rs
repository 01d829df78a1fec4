// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// Declarative configuration of the [`GitHubRepositoryConfig`](crate::types::GitHubRepositoryConfig)
/// type for use with apply.
///
/// Unset fields are left out of the serialized patch, so the server keeps whatever
/// value another field manager owns for them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepositoryConfigApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_workflow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_dashboard_previews: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_linter: Option<bool>,
}

impl GitHubRepositoryConfigApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owner (user or organization). If called multiple times, the last value wins.
    pub fn with_owner(mut self, value: impl Into<String>) -> Self {
        self.owner = Some(value.into());
        self
    }

    pub fn with_repository(mut self, value: impl Into<String>) -> Self {
        self.repository = Some(value.into());
        self
    }

    pub fn with_branch(mut self, value: impl Into<String>) -> Self {
        self.branch = Some(value.into());
        self
    }

    pub fn with_token(mut self, value: impl Into<String>) -> Self {
        self.token = Some(value.into());
        self
    }

    pub fn with_branch_workflow(mut self, value: bool) -> Self {
        self.branch_workflow = Some(value);
        self
    }

    pub fn with_generate_dashboard_previews(mut self, value: bool) -> Self {
        self.generate_dashboard_previews = Some(value);
        self
    }

    pub fn with_pull_request_linter(mut self, value: bool) -> Self {
        self.pull_request_linter = Some(value);
        self
    }
}
