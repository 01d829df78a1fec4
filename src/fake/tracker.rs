// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory object store behind the fake API server.
//!
//! Objects are kept as JSON so one tracker can hold any registered resource.
//! Every write bumps a single tracker-wide resource version and is appended to
//! an event log that watch requests replay. The log keeps the most recent
//! [`DEFAULT_EVENT_HISTORY`] events; watching from an older version fails with
//! 410 Expired, as it does against a real apiserver.

use super::selector::ListFilter;
use super::status::StatusError;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Number of events kept for watch replay unless configured otherwise
pub const DEFAULT_EVENT_HISTORY: usize = 1024;

/// A resource type the fake server knows how to serve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceInfo {
    pub group: String,
    pub version: String,
    pub plural: String,
    pub kind: String,
    /// Whether `status` is only writable through the `/status` subresource
    pub status_subresource: bool,
}

impl ResourceInfo {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// `plural.group`, the form used in API error messages
    pub fn qualified_name(&self) -> String {
        if self.group.is_empty() {
            self.plural.clone()
        } else {
            format!("{}.{}", self.plural, self.group)
        }
    }

    pub fn list_kind(&self) -> String {
        format!("{}List", self.kind)
    }
}

/// How a patch body is combined with the stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    Merge,
    /// Treated as a JSON merge patch; list merge keys are not modelled
    StrategicMerge,
    /// Server-side apply: creates the object when missing, merges otherwise
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Added,
    Modified,
    Deleted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    group: String,
    plural: String,
    namespace: String,
    name: String,
}

impl ObjectKey {
    fn new(resource: &ResourceInfo, namespace: &str, name: &str) -> Self {
        Self {
            group: resource.group.clone(),
            plural: resource.plural.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    fn is_in(&self, resource: &ResourceInfo, namespace: Option<&str>) -> bool {
        self.group == resource.group
            && self.plural == resource.plural
            && namespace.map_or(true, |ns| self.namespace == ns)
    }
}

#[derive(Debug, Clone)]
struct RecordedEvent {
    resource_version: u64,
    key: ObjectKey,
    event_type: EventType,
    object: Value,
}

#[derive(Debug)]
struct TrackerState {
    resource_version: u64,
    objects: BTreeMap<ObjectKey, Value>,
    events: VecDeque<RecordedEvent>,
    event_history: usize,
    /// Highest resource version dropped from `events`
    compacted_through: u64,
}

impl TrackerState {
    fn next_resource_version(&mut self) -> u64 {
        self.resource_version += 1;
        self.resource_version
    }

    /// Stamps a new resource version on `object`, stores it and records the event
    fn commit(&mut self, key: ObjectKey, mut object: Value, event_type: EventType) -> Value {
        let version = self.next_resource_version();
        if let Some(meta) = metadata_mut(&mut object) {
            meta.insert("resourceVersion".into(), Value::String(version.to_string()));
        }

        match event_type {
            EventType::Deleted => {
                self.objects.remove(&key);
            }
            EventType::Added | EventType::Modified => {
                self.objects.insert(key.clone(), object.clone());
            }
        }

        self.events.push_back(RecordedEvent {
            resource_version: version,
            key,
            event_type,
            object: object.clone(),
        });
        while self.events.len() > self.event_history {
            if let Some(dropped) = self.events.pop_front() {
                self.compacted_through = dropped.resource_version;
            }
        }
        object
    }
}

/// Thread-safe store of API objects
#[derive(Debug)]
pub struct ObjectTracker {
    state: Mutex<TrackerState>,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self::with_event_history(DEFAULT_EVENT_HISTORY)
    }

    /// A tracker that keeps at most `limit` events for watch replay
    pub fn with_event_history(limit: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                resource_version: 0,
                objects: BTreeMap::new(),
                events: VecDeque::new(),
                event_history: limit,
                compacted_through: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest resource version handed out
    pub fn resource_version(&self) -> u64 {
        self.state().resource_version
    }

    /// Seeds an object, taking the namespace from its own metadata. Unlike
    /// [`create`](Self::create) the object's `status` is stored as given.
    pub fn add(&self, resource: &ResourceInfo, object: Value) -> Result<Value, StatusError> {
        let namespace = meta_str(&object, "namespace").unwrap_or_default().to_string();
        self.insert(resource, &namespace, object, false)
    }

    /// With a status subresource, any `status` in the body is dropped.
    pub fn create(
        &self,
        resource: &ResourceInfo,
        namespace: &str,
        mut object: Value,
        dry_run: bool,
    ) -> Result<Value, StatusError> {
        if resource.status_subresource {
            replace_field(&mut object, "status", None);
        }
        self.insert(resource, namespace, object, dry_run)
    }

    fn insert(
        &self,
        resource: &ResourceInfo,
        namespace: &str,
        mut object: Value,
        dry_run: bool,
    ) -> Result<Value, StatusError> {
        let mut state = self.state();

        if let Some(body_ns) = meta_str(&object, "namespace") {
            if !body_ns.is_empty() && body_ns != namespace {
                return Err(StatusError::bad_request(
                    "the namespace of the provided object does not match the namespace sent on the request",
                ));
            }
        }

        let name = match meta_str(&object, "name").filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => match meta_str(&object, "generateName").filter(|n| !n.is_empty()) {
                Some(prefix) => format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..5]),
                None => {
                    return Err(StatusError::invalid(format!(
                        "{} is invalid: metadata.name: Required value: name or generateName is required",
                        resource.kind
                    )))
                }
            },
        };

        let key = ObjectKey::new(resource, namespace, &name);
        if state.objects.contains_key(&key) {
            return Err(StatusError::already_exists(&resource.qualified_name(), &name));
        }

        set_type_meta(resource, &mut object);
        let meta = metadata_mut(&mut object)
            .ok_or_else(|| StatusError::bad_request("object must be a JSON object"))?;
        meta.insert("name".into(), Value::String(name.clone()));
        if !namespace.is_empty() {
            meta.insert("namespace".into(), Value::String(namespace.to_string()));
        }
        meta.insert("uid".into(), Value::String(Uuid::new_v4().to_string()));
        meta.insert(
            "creationTimestamp".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        meta.insert("generation".into(), Value::from(1));

        if dry_run {
            return Ok(object);
        }

        debug!("Tracker: created {}/{}/{}", resource.plural, namespace, name);
        Ok(state.commit(key, object, EventType::Added))
    }

    pub fn get(&self, resource: &ResourceInfo, namespace: &str, name: &str) -> Result<Value, StatusError> {
        self.state()
            .objects
            .get(&ObjectKey::new(resource, namespace, name))
            .cloned()
            .ok_or_else(|| StatusError::not_found(&resource.qualified_name(), name))
    }

    /// Objects matching the filter, ordered by namespace then name, with the current resource version
    pub fn list(
        &self,
        resource: &ResourceInfo,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> (Vec<Value>, u64) {
        let state = self.state();
        let items = state
            .objects
            .iter()
            .filter(|(key, object)| key.is_in(resource, namespace) && filter.matches(object))
            .map(|(_, object)| object.clone())
            .collect();
        (items, state.resource_version)
    }

    /// Replaces an object. With a status subresource, writes to the main resource keep the
    /// stored status and writes to `status` keep everything else.
    pub fn update(
        &self,
        resource: &ResourceInfo,
        namespace: &str,
        name: &str,
        object: Value,
        subresource: Option<&str>,
        dry_run: bool,
    ) -> Result<Value, StatusError> {
        check_subresource(resource, subresource)?;
        if let Some(body_name) = meta_str(&object, "name") {
            if body_name != name {
                return Err(StatusError::bad_request(format!(
                    "the name of the object ({}) does not match the name on the URL ({})",
                    body_name, name
                )));
            }
        }

        let mut state = self.state();
        let key = ObjectKey::new(resource, namespace, name);
        let existing = state
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StatusError::not_found(&resource.qualified_name(), name))?;

        if let Some(expected) = meta_str(&object, "resourceVersion").filter(|v| !v.is_empty()) {
            if Some(expected) != meta_str(&existing, "resourceVersion") {
                return Err(StatusError::conflict(&resource.qualified_name(), name));
            }
        }

        let updated = match (resource.status_subresource, subresource) {
            (true, Some("status")) => {
                let mut updated = existing.clone();
                replace_field(&mut updated, "status", object.get("status").cloned());
                updated
            }
            (true, _) => {
                let mut updated = object;
                replace_field(&mut updated, "status", existing.get("status").cloned());
                updated
            }
            (false, _) => object,
        };

        let updated = finalize_update(resource, &existing, updated);
        if dry_run {
            return Ok(updated);
        }

        debug!("Tracker: updated {}/{}/{}", resource.plural, namespace, name);
        Ok(state.commit(key, updated, EventType::Modified))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn patch(
        &self,
        resource: &ResourceInfo,
        namespace: &str,
        name: &str,
        kind: PatchKind,
        patch: &Value,
        subresource: Option<&str>,
        dry_run: bool,
    ) -> Result<Value, StatusError> {
        check_subresource(resource, subresource)?;
        if !patch.is_object() {
            return Err(StatusError::bad_request("patch body must be a JSON object"));
        }

        let precondition = meta_str(patch, "resourceVersion")
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let status_only = subresource == Some("status");
        let mut patch = patch.clone();
        if resource.status_subresource {
            if status_only {
                let status = patch.get("status").cloned();
                patch = Value::Object(Map::new());
                replace_field(&mut patch, "status", status);
            } else {
                replace_field(&mut patch, "status", None);
            }
        }

        let mut state = self.state();
        let key = ObjectKey::new(resource, namespace, name);
        let existing = match state.objects.get(&key).cloned() {
            Some(existing) => existing,
            None if kind == PatchKind::Apply && !status_only => {
                drop(state);
                debug!("Tracker: apply creates {}/{}/{}", resource.plural, namespace, name);
                if let Some(meta) = metadata_mut(&mut patch) {
                    meta.insert("name".into(), Value::String(name.to_string()));
                }
                return self.create(resource, namespace, patch, dry_run);
            }
            None => return Err(StatusError::not_found(&resource.qualified_name(), name)),
        };

        if let Some(expected) = precondition.as_deref() {
            if Some(expected) != meta_str(&existing, "resourceVersion") {
                return Err(StatusError::conflict(&resource.qualified_name(), name));
            }
        }

        let mut updated = existing.clone();
        merge_patch(&mut updated, &patch);
        let updated = finalize_update(resource, &existing, updated);
        if dry_run {
            return Ok(updated);
        }

        debug!("Tracker: patched {}/{}/{}", resource.plural, namespace, name);
        Ok(state.commit(key, updated, EventType::Modified))
    }

    /// Removes an object and returns it as it was at deletion
    pub fn delete(
        &self,
        resource: &ResourceInfo,
        namespace: &str,
        name: &str,
        dry_run: bool,
    ) -> Result<Value, StatusError> {
        let mut state = self.state();
        let key = ObjectKey::new(resource, namespace, name);
        let existing = state
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StatusError::not_found(&resource.qualified_name(), name))?;

        if dry_run {
            return Ok(existing);
        }

        debug!("Tracker: deleted {}/{}/{}", resource.plural, namespace, name);
        Ok(state.commit(key, existing, EventType::Deleted))
    }

    pub fn delete_collection(
        &self,
        resource: &ResourceInfo,
        namespace: Option<&str>,
        filter: &ListFilter,
        dry_run: bool,
    ) -> Vec<Value> {
        let mut state = self.state();
        let matching: Vec<(ObjectKey, Value)> = state
            .objects
            .iter()
            .filter(|(key, object)| key.is_in(resource, namespace) && filter.matches(object))
            .map(|(key, object)| (key.clone(), object.clone()))
            .collect();

        if dry_run {
            return matching.into_iter().map(|(_, object)| object).collect();
        }

        matching
            .into_iter()
            .map(|(key, object)| state.commit(key, object, EventType::Deleted))
            .collect()
    }

    /// Events a watch starting at `since` should see. A start of 0 yields the current
    /// objects as ADDED events. Fails with 410 Expired when events after `since`
    /// have already been dropped from the history.
    pub fn events_since(
        &self,
        resource: &ResourceInfo,
        namespace: Option<&str>,
        since: u64,
        filter: &ListFilter,
    ) -> Result<Vec<(EventType, Value)>, StatusError> {
        let state = self.state();

        if since == 0 {
            return Ok(state
                .objects
                .iter()
                .filter(|(key, object)| key.is_in(resource, namespace) && filter.matches(object))
                .map(|(_, object)| (EventType::Added, object.clone()))
                .collect());
        }
        if since < state.compacted_through {
            return Err(StatusError::expired(since, state.compacted_through));
        }

        Ok(state
            .events
            .iter()
            .filter(|e| e.resource_version > since)
            .filter(|e| e.key.is_in(resource, namespace) && filter.matches(&e.object))
            .map(|e| (e.event_type, e.object.clone()))
            .collect())
    }
}

/// Only `status` exists as a subresource, and only where it is registered
fn check_subresource(resource: &ResourceInfo, subresource: Option<&str>) -> Result<(), StatusError> {
    match subresource {
        None => Ok(()),
        Some("status") if resource.status_subresource => Ok(()),
        Some(_) => Err(StatusError::new(
            404,
            "NotFound",
            "the server could not find the requested resource",
        )),
    }
}

fn meta_str<'a>(object: &'a Value, field: &str) -> Option<&'a str> {
    object.get("metadata")?.get(field)?.as_str()
}

fn metadata_mut(object: &mut Value) -> Option<&mut Map<String, Value>> {
    let root = object.as_object_mut()?;
    let meta = root
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    meta.as_object_mut()
}

fn set_type_meta(resource: &ResourceInfo, object: &mut Value) {
    if let Some(root) = object.as_object_mut() {
        root.insert("apiVersion".into(), Value::String(resource.api_version()));
        root.insert("kind".into(), Value::String(resource.kind.clone()));
    }
}

fn replace_field(object: &mut Value, field: &str, value: Option<Value>) {
    if let Some(root) = object.as_object_mut() {
        match value {
            Some(value) => {
                root.insert(field.to_string(), value);
            }
            None => {
                root.remove(field);
            }
        }
    }
}

/// Carries server-owned metadata over from the stored object and bumps `generation`
/// when the spec changed.
fn finalize_update(resource: &ResourceInfo, existing: &Value, mut updated: Value) -> Value {
    set_type_meta(resource, &mut updated);

    let generation = existing
        .pointer("/metadata/generation")
        .and_then(Value::as_i64)
        .unwrap_or(1);
    let generation = if existing.get("spec") != updated.get("spec") {
        generation + 1
    } else {
        generation
    };

    if let Some(meta) = metadata_mut(&mut updated) {
        for field in ["name", "namespace", "uid", "creationTimestamp"] {
            match existing.get("metadata").and_then(|m| m.get(field)) {
                Some(value) => {
                    meta.insert(field.to_string(), value.clone());
                }
                None => {
                    meta.remove(field);
                }
            }
        }
        meta.insert("generation".into(), Value::from(generation));
    }
    updated
}

/// JSON merge patch (RFC 7386): objects merge recursively, `null` removes a key,
/// everything else replaces.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(entries) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in entries {
            if value.is_null() {
                map.remove(key);
            } else {
                merge_patch(map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
