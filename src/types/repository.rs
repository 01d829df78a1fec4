// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::api::ObjectList;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A source of dashboards and folders that is synchronized into Grafana.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "provisioning.grafana.app",
    version = "v0alpha1",
    kind = "Repository",
    plural = "repositories",
    shortname = "repo",
    namespaced,
    status = "RepositoryStatus",
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"Sync", "type":"string", "jsonPath":".status.sync.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpec {
    /// Display name shown in the UI
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When set, the UI will not offer to write changes back to the repository
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_yaml: Option<bool>,
    pub sync: SyncOptions,
    #[serde(rename = "type")]
    pub repository_type: RepositoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalRepositoryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubRepositoryConfig>,
}

pub type RepositoryList = ObjectList<Repository>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    #[default]
    Local,
    #[serde(rename = "github")]
    GitHub,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncTargetType {
    /// Resources are synced into the whole instance
    #[default]
    Instance,
    /// Resources are synced into a single folder
    Folder,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    pub enabled: bool,
    pub target: SyncTargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct LocalRepositoryConfig {
    pub path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepositoryConfig {
    pub owner: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Changes are proposed on branches instead of written to `branch` directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_workflow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_dashboard_previews: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_linter: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatus {
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default)]
    pub health: HealthStatus,
    #[serde(default)]
    pub sync: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<ResourceCount>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Unix epoch milliseconds of the last health check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message: Vec<String>,
}

/// Lifecycle phase of a background sync job
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Pending,
    Working,
    Success,
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Working => "working",
            JobState::Success => "success",
            JobState::Error => "error",
        }
    }

    /// Whether the job has stopped running
    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Success | JobState::Error)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "working" => Ok(JobState::Working),
            "success" => Ok(JobState::Success),
            "error" => Ok(JobState::Error),
            other => Err(format!("unknown job state '{}'", other)),
        }
    }
}

/// Observed status of the most recent sync job. Timestamps are Unix epoch milliseconds.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub state: JobState,
    #[serde(rename = "job", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<i64>,
    #[serde(default)]
    pub message: Vec<String>,
    /// Hash of the repository contents at the last sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ResourceCount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub resource: String,
    pub count: i64,
}

impl Repository {
    /// State of the last sync job, if the status has been reported
    pub fn sync_state(&self) -> Option<JobState> {
        self.status.as_ref().map(|s| s.sync.state)
    }

    pub fn is_healthy(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.health.healthy)
    }

    /// The GitHub settings, when this is a GitHub-backed repository
    pub fn github(&self) -> Option<&GitHubRepositoryConfig> {
        match self.spec.repository_type {
            RepositoryType::GitHub => self.spec.github.as_ref(),
            RepositoryType::Local => None,
        }
    }
}
