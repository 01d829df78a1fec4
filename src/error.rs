// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("{0}.metadata.name must be provided to apply")]
    MissingName(&'static str),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to seed fake client: {0}")]
    FakeSetupError(#[from] crate::fake::StatusError),
}

impl ProvisioningError {
    /// HTTP status code of the API server response, if this error carries one
    pub fn api_code(&self) -> Option<u16> {
        match self {
            ProvisioningError::KubeError(kube::Error::Api(err)) => Some(err.code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }
}

pub type Result<T> = std::result::Result<T, ProvisioningError>;
