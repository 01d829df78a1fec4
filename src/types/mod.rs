// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types of the provisioning.grafana.app/v0alpha1 API group.

pub mod repository;

pub use repository::{
    GitHubRepositoryConfig, HealthStatus, JobState, LocalRepositoryConfig, Repository,
    RepositoryList, RepositorySpec, RepositoryStatus, RepositoryType, ResourceCount, SyncOptions,
    SyncStatus, SyncTargetType,
};
