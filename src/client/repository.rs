// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed client for Repository resources

use crate::applyconfiguration::RepositoryApplyConfiguration;
use crate::error::{ProvisioningError, Result};
use crate::types::{Repository, RepositoryList};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use kube::api::{
    DeleteParams, GetParams, ListParams, Patch, PatchParams, PostParams, WatchEvent, WatchParams,
};
use kube::{Api, Client, ResourceExt};
use serde_json::Value;
use tracing::{debug, instrument};

/// Stream of change events returned by [`RepositoryInterface::watch`]
pub type RepositoryWatchStream = BoxStream<'static, Result<WatchEvent<Repository>>>;

/// Returns the Repository client for a namespace.
pub trait RepositoriesGetter {
    fn repositories(&self, namespace: &str) -> Repositories;
}

/// Operations on Repository resources in one namespace.
///
/// Every call issues a single request. Errors from the API server or the
/// transport are returned unchanged inside [`ProvisioningError::KubeError`].
#[async_trait]
pub trait RepositoryInterface: Send + Sync {
    async fn create(&self, repository: &Repository, pp: &PostParams) -> Result<Repository>;

    async fn update(&self, repository: &Repository, pp: &PostParams) -> Result<Repository>;

    /// Replaces only the status subresource.
    async fn update_status(&self, repository: &Repository, pp: &PostParams) -> Result<Repository>;

    async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<()>;

    async fn delete_collection(&self, dp: &DeleteParams, lp: &ListParams) -> Result<()>;

    async fn get(&self, name: &str, gp: &GetParams) -> Result<Repository>;

    async fn list(&self, lp: &ListParams) -> Result<RepositoryList>;

    /// Opens a watch starting after `resource_version`.
    async fn watch(&self, wp: &WatchParams, resource_version: &str) -> Result<RepositoryWatchStream>;

    /// Patches the object, or the named subresource when `subresource` is set.
    async fn patch(
        &self,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<Value>,
        subresource: Option<&str>,
    ) -> Result<Repository>;

    /// Server-side applies the configuration. `metadata.name` must be set.
    async fn apply(
        &self,
        repository: &RepositoryApplyConfiguration,
        opts: &ApplyOptions,
    ) -> Result<Repository>;

    async fn apply_status(
        &self,
        repository: &RepositoryApplyConfiguration,
        opts: &ApplyOptions,
    ) -> Result<Repository>;
}

/// Options for server-side apply requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub field_manager: String,
    /// Take ownership of fields managed by someone else instead of failing with a conflict
    pub force: bool,
    pub dry_run: bool,
}

impl ApplyOptions {
    pub fn new(field_manager: impl Into<String>) -> Self {
        Self {
            field_manager: field_manager.into(),
            force: false,
            dry_run: false,
        }
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    fn patch_params(&self) -> PatchParams {
        let mut pp = PatchParams::apply(&self.field_manager);
        if self.force {
            pp = pp.force();
        }
        if self.dry_run {
            pp = pp.dry_run();
        }
        pp
    }
}

/// [`RepositoryInterface`] backed by `kube::Api<Repository>`
#[derive(Clone)]
pub struct Repositories {
    api: Api<Repository>,
    namespace: String,
}

impl Repositories {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl RepositoryInterface for Repositories {
    #[instrument(skip(self, repository, pp), fields(namespace = %self.namespace, name = %repository.name_any()))]
    async fn create(&self, repository: &Repository, pp: &PostParams) -> Result<Repository> {
        debug!("Creating repository");
        Ok(self.api.create(pp, repository).await?)
    }

    #[instrument(skip(self, repository, pp), fields(namespace = %self.namespace, name = %repository.name_any()))]
    async fn update(&self, repository: &Repository, pp: &PostParams) -> Result<Repository> {
        debug!("Replacing repository");
        Ok(self.api.replace(&repository.name_any(), pp, repository).await?)
    }

    #[instrument(skip(self, repository, pp), fields(namespace = %self.namespace, name = %repository.name_any()))]
    async fn update_status(&self, repository: &Repository, pp: &PostParams) -> Result<Repository> {
        debug!("Replacing repository status");
        let data = serde_json::to_vec(repository)?;
        Ok(self
            .api
            .replace_status(&repository.name_any(), pp, data)
            .await?)
    }

    #[instrument(skip(self, dp), fields(namespace = %self.namespace))]
    async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<()> {
        debug!("Deleting repository");
        self.api.delete(name, dp).await?;
        Ok(())
    }

    #[instrument(skip(self, dp, lp), fields(namespace = %self.namespace))]
    async fn delete_collection(&self, dp: &DeleteParams, lp: &ListParams) -> Result<()> {
        debug!("Deleting repository collection");
        self.api.delete_collection(dp, lp).await?;
        Ok(())
    }

    #[instrument(skip(self, gp), fields(namespace = %self.namespace))]
    async fn get(&self, name: &str, gp: &GetParams) -> Result<Repository> {
        Ok(self.api.get_with(name, gp).await?)
    }

    #[instrument(skip(self, lp), fields(namespace = %self.namespace))]
    async fn list(&self, lp: &ListParams) -> Result<RepositoryList> {
        let list = self.api.list(lp).await?;
        debug!("Listed {} repositories", list.items.len());
        Ok(list)
    }

    #[instrument(skip(self, wp), fields(namespace = %self.namespace))]
    async fn watch(&self, wp: &WatchParams, resource_version: &str) -> Result<RepositoryWatchStream> {
        debug!("Opening repository watch");
        let stream = self.api.watch(wp, resource_version).await?;
        Ok(stream.map_err(ProvisioningError::from).boxed())
    }

    #[instrument(skip(self, pp, patch), fields(namespace = %self.namespace))]
    async fn patch(
        &self,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<Value>,
        subresource: Option<&str>,
    ) -> Result<Repository> {
        debug!("Patching repository");
        let patched = match subresource {
            Some(subresource) => self.api.patch_subresource(subresource, name, pp, patch).await?,
            None => self.api.patch(name, pp, patch).await?,
        };
        Ok(patched)
    }

    #[instrument(skip(self, repository, opts), fields(namespace = %self.namespace, field_manager = %opts.field_manager))]
    async fn apply(
        &self,
        repository: &RepositoryApplyConfiguration,
        opts: &ApplyOptions,
    ) -> Result<Repository> {
        let name = repository
            .name()
            .ok_or(ProvisioningError::MissingName("repository"))?;
        debug!("Applying repository {}", name);
        Ok(self
            .api
            .patch(name, &opts.patch_params(), &Patch::Apply(repository))
            .await?)
    }

    #[instrument(skip(self, repository, opts), fields(namespace = %self.namespace, field_manager = %opts.field_manager))]
    async fn apply_status(
        &self,
        repository: &RepositoryApplyConfiguration,
        opts: &ApplyOptions,
    ) -> Result<Repository> {
        let name = repository
            .name()
            .ok_or(ProvisioningError::MissingName("repository"))?;
        debug!("Applying repository status {}", name);
        Ok(self
            .api
            .patch_status(name, &opts.patch_params(), &Patch::Apply(repository))
            .await?)
    }
}
