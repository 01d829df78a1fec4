// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! A `tower::Service` that answers Kubernetes REST requests from an [`ObjectTracker`].

use super::selector::ListFilter;
use super::status::StatusError;
use super::tracker::{EventType, ObjectTracker, PatchKind, ResourceInfo};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, Uri};
use http_body_util::BodyExt;
use kube::client::Body;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tower::Service;
use tracing::debug;

/// The API verb a request was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Watch,
    Create,
    Update,
    Patch,
    Delete,
    DeleteCollection,
}

/// A request received by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub verb: Verb,
    /// Plural resource name, e.g. `repositories`
    pub resource: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub subresource: Option<String>,
}

/// A canned failure returned instead of touching the tracker.
/// A `resource` of `*` matches every resource.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub verb: Verb,
    pub resource: String,
    pub error: StatusError,
}

impl Reaction {
    fn matches(&self, action: &Action) -> bool {
        self.verb == action.verb && (self.resource == "*" || self.resource == action.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestTarget {
    group: String,
    version: String,
    namespace: Option<String>,
    plural: String,
    name: Option<String>,
    subresource: Option<String>,
}

impl RequestTarget {
    /// Splits `/api/{v}/...` and `/apis/{g}/{v}/...` paths into their parts
    fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (group, version, rest) = match segments.as_slice() {
            ["api", version, rest @ ..] => ("", *version, rest),
            ["apis", group, version, rest @ ..] => (*group, *version, rest),
            _ => return None,
        };
        let (namespace, rest) = match rest {
            ["namespaces", namespace, rest @ ..] if !rest.is_empty() => (Some(namespace.to_string()), rest),
            _ => (None, rest),
        };
        let (plural, tail) = rest.split_first()?;

        Some(Self {
            group: group.to_string(),
            version: version.to_string(),
            namespace,
            plural: plural.to_string(),
            name: tail.first().map(|s| s.to_string()),
            subresource: tail.get(1).map(|s| s.to_string()),
        })
    }
}

struct Reply {
    code: u16,
    body: Vec<u8>,
}

impl Reply {
    fn json(code: u16, value: &Value) -> Self {
        Self {
            code,
            body: value.to_string().into_bytes(),
        }
    }

    fn error(error: &StatusError) -> Self {
        Self::json(error.code, &error.to_status())
    }

    fn from_result(code: u16, result: Result<Value, StatusError>) -> Self {
        match result {
            Ok(value) => Self::json(code, &value),
            Err(error) => Self::error(&error),
        }
    }
}

pub(crate) struct FakeState {
    pub(crate) tracker: ObjectTracker,
    resources: Vec<ResourceInfo>,
    reactions: Vec<Reaction>,
    actions: Mutex<Vec<Action>>,
}

impl FakeState {
    pub(crate) fn new(resources: Vec<ResourceInfo>, reactions: Vec<Reaction>) -> Self {
        Self {
            tracker: ObjectTracker::new(),
            resources,
            reactions,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn actions(&self) -> MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resource(&self, target: &RequestTarget) -> Option<&ResourceInfo> {
        self.resources.iter().find(|r| {
            r.group == target.group && r.version == target.version && r.plural == target.plural
        })
    }

    fn handle(&self, method: &Method, uri: &Uri, content_type: &str, body: &Bytes) -> Reply {
        debug!("Fake API: {} {}", method, uri);

        let Some(target) = RequestTarget::parse(uri.path()) else {
            return Reply::error(&StatusError::new(
                404,
                "NotFound",
                "the server could not find the requested resource",
            ));
        };
        let query: HashMap<String, String> = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect();

        let is_watch = query.get("watch").is_some_and(|v| v == "true" || v == "1");
        let verb = match (method, target.name.is_some()) {
            (&Method::GET, false) if is_watch => Verb::Watch,
            (&Method::GET, false) => Verb::List,
            (&Method::GET, true) => Verb::Get,
            (&Method::POST, false) => Verb::Create,
            (&Method::PUT, true) => Verb::Update,
            (&Method::PATCH, true) => Verb::Patch,
            (&Method::DELETE, true) => Verb::Delete,
            (&Method::DELETE, false) => Verb::DeleteCollection,
            _ => return Reply::error(&StatusError::method_not_allowed(method.as_str())),
        };

        let action = Action {
            verb,
            resource: target.plural.clone(),
            namespace: target.namespace.clone(),
            name: target.name.clone(),
            subresource: target.subresource.clone(),
        };
        let reaction = self.reactions.iter().find(|r| r.matches(&action));
        self.actions().push(action);

        if let Some(reaction) = reaction {
            debug!("Fake API: reacting to {:?} with {}", verb, reaction.error);
            return Reply::error(&reaction.error);
        }

        let Some(resource) = self.resource(&target) else {
            return Reply::error(&StatusError::new(
                404,
                "NotFound",
                "the server could not find the requested resource",
            ));
        };

        match self.dispatch(verb, resource, &target, &query, content_type, body) {
            Ok(reply) => reply,
            Err(error) => Reply::error(&error),
        }
    }

    fn dispatch(
        &self,
        verb: Verb,
        resource: &ResourceInfo,
        target: &RequestTarget,
        query: &HashMap<String, String>,
        content_type: &str,
        body: &Bytes,
    ) -> Result<Reply, StatusError> {
        let namespace = target.namespace.as_deref().unwrap_or("");
        let name = target.name.as_deref().unwrap_or("");
        let subresource = target.subresource.as_deref();
        let dry_run = query.get("dryRun").is_some_and(|v| v == "All");
        let filter = || {
            ListFilter::parse(
                query.get("labelSelector").map(String::as_str),
                query.get("fieldSelector").map(String::as_str),
            )
        };

        let reply = match verb {
            Verb::Get => Reply::from_result(200, self.tracker.get(resource, namespace, name)),
            Verb::List => {
                let (items, version) = self.tracker.list(resource, target.namespace.as_deref(), &filter()?);
                Reply::json(200, &list_body(resource, items, version))
            }
            Verb::Watch => {
                let since = parse_resource_version(query.get("resourceVersion"))?;
                let body = match self
                    .tracker
                    .events_since(resource, target.namespace.as_deref(), since, &filter()?)
                {
                    Ok(events) => watch_body(events),
                    Err(error) => watch_error_body(&error),
                };
                Reply { code: 200, body }
            }
            Verb::Create => {
                let object = parse_json(body)?;
                Reply::from_result(201, self.tracker.create(resource, namespace, object, dry_run))
            }
            Verb::Update => {
                let object = parse_json(body)?;
                Reply::from_result(
                    200,
                    self.tracker
                        .update(resource, namespace, name, object, subresource, dry_run),
                )
            }
            Verb::Patch => {
                let (kind, patch) = parse_patch(content_type, body)?;
                Reply::from_result(
                    200,
                    self.tracker
                        .patch(resource, namespace, name, kind, &patch, subresource, dry_run),
                )
            }
            Verb::Delete => Reply::from_result(200, self.tracker.delete(resource, namespace, name, dry_run)),
            Verb::DeleteCollection => {
                let deleted = self.tracker.delete_collection(
                    resource,
                    target.namespace.as_deref(),
                    &filter()?,
                    dry_run,
                );
                Reply::json(200, &list_body(resource, deleted, self.tracker.resource_version()))
            }
        };
        Ok(reply)
    }
}

fn parse_json(body: &Bytes) -> Result<Value, StatusError> {
    serde_json::from_slice(body)
        .map_err(|e| StatusError::bad_request(format!("failed to decode request body: {}", e)))
}

fn parse_patch(content_type: &str, body: &Bytes) -> Result<(PatchKind, Value), StatusError> {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    match media_type {
        "application/merge-patch+json" => Ok((PatchKind::Merge, parse_json(body)?)),
        "application/strategic-merge-patch+json" => Ok((PatchKind::StrategicMerge, parse_json(body)?)),
        "application/apply-patch+yaml" => {
            let patch = serde_yaml::from_slice(body)
                .map_err(|e| StatusError::bad_request(format!("failed to decode apply patch: {}", e)))?;
            Ok((PatchKind::Apply, patch))
        }
        other => Err(StatusError::unsupported_media_type(other)),
    }
}

fn parse_resource_version(raw: Option<&String>) -> Result<u64, StatusError> {
    match raw.map(String::as_str) {
        None | Some("") => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| StatusError::invalid(format!("resourceVersion: Invalid value: \"{}\"", raw))),
    }
}

fn list_body(resource: &ResourceInfo, items: Vec<Value>, version: u64) -> Value {
    json!({
        "apiVersion": resource.api_version(),
        "kind": resource.list_kind(),
        "metadata": {"resourceVersion": version.to_string()},
        "items": items
    })
}

/// Newline-delimited watch events; the stream ends after the last one
fn watch_body(events: Vec<(EventType, Value)>) -> Vec<u8> {
    let mut body = Vec::new();
    for (event_type, object) in events {
        body.extend_from_slice(json!({"type": event_type.as_str(), "object": object}).to_string().as_bytes());
        body.push(b'\n');
    }
    body
}

/// A watch that cannot start is reported in-stream as a single ERROR event
fn watch_error_body(error: &StatusError) -> Vec<u8> {
    let mut body = json!({"type": "ERROR", "object": error.to_status()})
        .to_string()
        .into_bytes();
    body.push(b'\n');
    body
}

/// HTTP transport for a fake `kube::Client`
#[derive(Clone)]
pub struct FakeService {
    state: Arc<FakeState>,
}

impl FakeService {
    pub(crate) fn new(state: Arc<FakeState>) -> Self {
        Self { state }
    }
}

impl Service<Request<Body>> for FakeService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            let content_type = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let reply = state.handle(&parts.method, &parts.uri, content_type, &body);

            let response = Response::builder()
                .status(reply.code)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(reply.body))?;
            Ok(response)
        })
    }
}
