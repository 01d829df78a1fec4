// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{
    ObjectMetaApplyConfiguration, RepositorySpecApplyConfiguration,
    RepositoryStatusApplyConfiguration,
};
use crate::types::Repository;
use kube::Resource;
use serde::{Deserialize, Serialize};

/// Declarative configuration of the [`Repository`] type for use with apply.
///
/// This is the body of a server-side apply request: `apiVersion`, `kind` and
/// `metadata.name` identify the object, every other field is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMetaApplyConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<RepositorySpecApplyConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RepositoryStatusApplyConfiguration>,
}

impl RepositoryApplyConfiguration {
    /// Constructs a configuration for the Repository with the given name and namespace.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: Some(Repository::api_version(&()).into_owned()),
            kind: Some(Repository::kind(&()).into_owned()),
            metadata: Some(
                ObjectMetaApplyConfiguration::new()
                    .with_name(name)
                    .with_namespace(namespace),
            ),
            spec: None,
            status: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.name.as_deref())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.namespace.as_deref())
    }

    fn metadata_mut(&mut self) -> &mut ObjectMetaApplyConfiguration {
        self.metadata.get_or_insert_with(ObjectMetaApplyConfiguration::new)
    }

    pub fn with_labels<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let meta = self.metadata_mut();
        *meta = std::mem::take(meta).with_labels(entries);
        self
    }

    pub fn with_annotations<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let meta = self.metadata_mut();
        *meta = std::mem::take(meta).with_annotations(entries);
        self
    }

    pub fn with_spec(mut self, value: RepositorySpecApplyConfiguration) -> Self {
        self.spec = Some(value);
        self
    }

    pub fn with_status(mut self, value: RepositoryStatusApplyConfiguration) -> Self {
        self.status = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applyconfiguration::{GitHubRepositoryConfigApplyConfiguration, SyncStatusApplyConfiguration};
    use crate::types::JobState;
    use serde_json::json;

    #[test]
    fn test_new_sets_identity() {
        let config = RepositoryApplyConfiguration::new("dashboards", "grafana");

        assert_eq!(config.name(), Some("dashboards"));
        assert_eq!(config.namespace(), Some("grafana"));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "apiVersion": "provisioning.grafana.app/v0alpha1",
                "kind": "Repository",
                "metadata": {"name": "dashboards", "namespace": "grafana"}
            })
        );
    }

    #[test]
    fn test_default_has_no_name() {
        assert_eq!(RepositoryApplyConfiguration::default().name(), None);
    }

    #[test]
    fn test_labels_and_annotations_merge() {
        let config = RepositoryApplyConfiguration::new("dashboards", "grafana")
            .with_labels([("team", "platform")])
            .with_labels([("tier", "gold"), ("team", "observability")])
            .with_annotations([("note", "managed")]);

        let meta = config.metadata.unwrap();
        assert_eq!(meta.labels.get("team").map(String::as_str), Some("observability"));
        assert_eq!(meta.labels.get("tier").map(String::as_str), Some("gold"));
        assert_eq!(meta.annotations.get("note").map(String::as_str), Some("managed"));
    }

    #[test]
    fn test_full_configuration() {
        let config = RepositoryApplyConfiguration::new("dashboards", "grafana")
            .with_spec(
                RepositorySpecApplyConfiguration::new()
                    .with_github(GitHubRepositoryConfigApplyConfiguration::new().with_branch("main")),
            )
            .with_status(
                RepositoryStatusApplyConfiguration::new()
                    .with_sync(SyncStatusApplyConfiguration::new().with_state(JobState::Success)),
            );

        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["spec"], json!({"github": {"branch": "main"}}));
        assert_eq!(value["status"], json!({"sync": {"state": "success"}}));
    }
}
