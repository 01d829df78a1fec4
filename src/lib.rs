// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed client, apply configurations and in-memory fake for Grafana's
//! provisioning.grafana.app/v0alpha1 `Repository` resource.

pub mod applyconfiguration;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod fake;
pub mod types;

pub use client::{ProvisioningV0alpha1Client, RepositoriesGetter, RepositoryInterface};
pub use error::{ProvisioningError, Result};
pub use types::Repository;
