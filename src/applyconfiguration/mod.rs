// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Apply configurations: optional-field mirrors of the domain types, built with
//! chained `with_*` setters and sent as server-side apply patches.

pub mod github_repository_config;
pub mod meta;
pub mod repository;
pub mod repository_spec;
pub mod repository_status;
pub mod sync_status;

pub use github_repository_config::GitHubRepositoryConfigApplyConfiguration;
pub use meta::ObjectMetaApplyConfiguration;
pub use repository::RepositoryApplyConfiguration;
pub use repository_spec::{
    LocalRepositoryConfigApplyConfiguration, RepositorySpecApplyConfiguration,
    SyncOptionsApplyConfiguration,
};
pub use repository_status::{
    HealthStatusApplyConfiguration, RepositoryStatusApplyConfiguration,
    ResourceCountApplyConfiguration,
};
pub use sync_status::SyncStatusApplyConfiguration;
