// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed clients for the provisioning.grafana.app/v0alpha1 API group.

pub mod repository;

pub use repository::{
    ApplyOptions, Repositories, RepositoriesGetter, RepositoryInterface, RepositoryWatchStream,
};

use kube::Client;

/// Entry point for the provisioning.grafana.app/v0alpha1 resources
#[derive(Clone)]
pub struct ProvisioningV0alpha1Client {
    client: Client,
}

impl ProvisioningV0alpha1Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the inferred kubeconfig or in-cluster configuration
    pub async fn try_default() -> crate::error::Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl RepositoriesGetter for ProvisioningV0alpha1Client {
    fn repositories(&self, namespace: &str) -> Repositories {
        Repositories::new(self.client.clone(), namespace)
    }
}
