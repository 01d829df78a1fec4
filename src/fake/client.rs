// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builder for `kube::Client`s that talk to an in-memory fake server.

use super::service::{Action, FakeService, FakeState, Reaction, Verb};
use super::status::StatusError;
use super::tracker::{ObjectTracker, ResourceInfo};
use crate::error::Result;
use kube::{Client, Resource};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

fn resource_info<K>(status_subresource: bool) -> ResourceInfo
where
    K: Resource<DynamicType = ()>,
{
    ResourceInfo {
        group: K::group(&()).into_owned(),
        version: K::version(&()).into_owned(),
        plural: K::plural(&()).into_owned(),
        kind: K::kind(&()).into_owned(),
        status_subresource,
    }
}

/// Configures the resources, seed objects and reactions of a [`FakeClient`]
#[derive(Default)]
pub struct FakeClientBuilder {
    resources: Vec<ResourceInfo>,
    objects: Vec<(ResourceInfo, serde_json::Result<Value>)>,
    reactions: Vec<Reaction>,
}

impl FakeClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, info: ResourceInfo) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.group == info.group && r.plural == info.plural)
        {
            Some(existing) => *existing = info,
            None => self.resources.push(info),
        }
    }

    /// Serve `K` with no status subresource
    pub fn with_resource<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        self.register(resource_info::<K>(false));
        self
    }

    /// Serve `K` with `status` only writable through the `/status` subresource
    pub fn with_status_resource<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        self.register(resource_info::<K>(true));
        self
    }

    /// Seed an object. Its resource is registered without a status subresource
    /// unless registered otherwise.
    pub fn with_object<K>(mut self, object: &K) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        self.objects
            .push((resource_info::<K>(false), serde_json::to_value(object)));
        self
    }

    /// Fail every request with `verb` on `resource` (plural name, or `*`) with `error`
    pub fn with_reaction(mut self, verb: Verb, resource: &str, error: StatusError) -> Self {
        self.reactions.push(Reaction {
            verb,
            resource: resource.to_string(),
            error,
        });
        self
    }

    /// Must be called from within a Tokio runtime.
    pub fn build(mut self) -> Result<FakeClient> {
        let mut seeds = Vec::with_capacity(self.objects.len());
        for (info, object) in std::mem::take(&mut self.objects) {
            let registered = self
                .resources
                .iter()
                .find(|r| r.group == info.group && r.plural == info.plural)
                .cloned();
            let info = match registered {
                Some(registered) => registered,
                None => {
                    self.register(info.clone());
                    info
                }
            };
            seeds.push((info, object?));
        }

        let state = Arc::new(FakeState::new(self.resources, self.reactions));
        for (info, object) in seeds {
            state.tracker.add(&info, object)?;
        }

        let client = Client::new(FakeService::new(state.clone()), "default");
        Ok(FakeClient { state, client })
    }
}

/// A `kube::Client` wired to an in-memory API server, plus access to what it stores and saw
#[derive(Clone)]
pub struct FakeClient {
    state: Arc<FakeState>,
    client: Client,
}

impl FakeClient {
    pub fn builder() -> FakeClientBuilder {
        FakeClientBuilder::new()
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn tracker(&self) -> &ObjectTracker {
        &self.state.tracker
    }

    /// Requests received so far, in arrival order
    pub fn actions(&self) -> Vec<Action> {
        self.state.actions().clone()
    }

    pub fn clear_actions(&self) {
        self.state.actions().clear();
    }
}
