// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-in for the Kubernetes API server.
//!
//! [`FakeClient`] produces a real `kube::Client` whose transport is a [`FakeService`]
//! backed by an [`ObjectTracker`], so code written against [`crate::client::Repositories`]
//! runs unchanged in tests. Every request is recorded as an [`Action`], and
//! [`Reaction`]s can be registered to make specific verbs fail.

mod client;
mod provisioning;
mod selector;
mod service;
mod status;
mod tracker;

pub use client::{FakeClient, FakeClientBuilder};
pub use provisioning::FakeProvisioningV0alpha1;
pub use selector::ListFilter;
pub use service::{Action, FakeService, Reaction, Verb};
pub use status::StatusError;
pub use tracker::{merge_patch, EventType, ObjectTracker, PatchKind, ResourceInfo};
