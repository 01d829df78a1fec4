// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fake provisioning.grafana.app/v0alpha1 client for tests.

use super::client::{FakeClient, FakeClientBuilder};
use crate::client::{Repositories, RepositoriesGetter};
use crate::error::Result;
use crate::types::Repository;

/// Hands out [`Repositories`] clients backed by an in-memory server instead of a cluster.
///
/// ```no_run
/// # async fn demo() -> provisioning_client::error::Result<()> {
/// use kube::api::GetParams;
/// use provisioning_client::client::{RepositoriesGetter, RepositoryInterface};
/// use provisioning_client::fake::FakeProvisioningV0alpha1;
///
/// let fake = FakeProvisioningV0alpha1::new()?;
/// let repos = fake.repositories("default");
/// assert!(repos.get("missing", &GetParams::default()).await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FakeProvisioningV0alpha1 {
    fake: FakeClient,
}

impl FakeProvisioningV0alpha1 {
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_objects(std::iter::empty())
    }

    /// Starts with the given repositories already stored
    pub fn with_objects<I>(objects: I) -> Result<Self>
    where
        I: IntoIterator<Item = Repository>,
    {
        let builder = objects
            .into_iter()
            .fold(Self::builder(), |builder, repo| builder.with_object(&repo));
        Ok(Self::from_fake(builder.build()?))
    }

    /// A builder with Repository registered, for adding reactions or other resources
    pub fn builder() -> FakeClientBuilder {
        FakeClient::builder().with_status_resource::<Repository>()
    }

    pub fn from_fake(fake: FakeClient) -> Self {
        Self { fake }
    }

    pub fn fake(&self) -> &FakeClient {
        &self.fake
    }
}

impl RepositoriesGetter for FakeProvisioningV0alpha1 {
    fn repositories(&self, namespace: &str) -> Repositories {
        Repositories::new(self.fake.client(), namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applyconfiguration::{
        GitHubRepositoryConfigApplyConfiguration, RepositoryApplyConfiguration,
        RepositorySpecApplyConfiguration, RepositoryStatusApplyConfiguration,
        SyncOptionsApplyConfiguration, SyncStatusApplyConfiguration,
    };
    use crate::client::{ApplyOptions, RepositoryInterface};
    use crate::error::ProvisioningError;
    use crate::fake::{StatusError, Verb};
    use crate::types::{
        GitHubRepositoryConfig, JobState, RepositorySpec, RepositoryStatus, RepositoryType,
        SyncOptions, SyncStatus, SyncTargetType,
    };
    use futures::TryStreamExt;
    use kube::api::{
        DeleteParams, GetParams, ListParams, ObjectMeta, Patch, PatchParams, PostParams,
        WatchEvent, WatchParams,
    };
    use kube::ResourceExt;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn make_repository(name: &str) -> Repository {
        Repository::new(
            name,
            RepositorySpec {
                title: format!("{} dashboards", name),
                description: None,
                read_only: false,
                prefer_yaml: None,
                sync: SyncOptions {
                    enabled: true,
                    target: SyncTargetType::Folder,
                    interval_seconds: Some(60),
                },
                repository_type: RepositoryType::GitHub,
                local: None,
                github: Some(GitHubRepositoryConfig {
                    owner: "acme".to_string(),
                    repository: name.to_string(),
                    branch: Some("main".to_string()),
                    ..Default::default()
                }),
            },
        )
    }

    fn labelled(name: &str, team: &str) -> Repository {
        let mut repo = make_repository(name);
        repo.metadata = ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([("team".to_string(), team.to_string())])),
            ..Default::default()
        };
        repo
    }

    fn names(repos: &[Repository]) -> Vec<String> {
        repos.iter().map(|r| r.name_any()).collect()
    }

    fn full_spec(title: &str) -> RepositorySpecApplyConfiguration {
        RepositorySpecApplyConfiguration::new()
            .with_title(title)
            .with_type(RepositoryType::GitHub)
            .with_sync(
                SyncOptionsApplyConfiguration::new()
                    .with_enabled(false)
                    .with_target(SyncTargetType::Instance),
            )
            .with_github(
                GitHubRepositoryConfigApplyConfiguration::new()
                    .with_owner("acme")
                    .with_repository("dashboards"),
            )
    }

    #[tokio::test]
    async fn test_create_then_get_returns_created() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");

        let created = repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();
        let fetched = repos.get("dashboards", &GetParams::default()).await.unwrap();

        assert_eq!(created.uid(), fetched.uid());
        assert_eq!(fetched.namespace().as_deref(), Some("default"));
        assert_eq!(fetched.spec, make_repository("dashboards").spec);
        assert_eq!(fetched.metadata.generation, Some(1));
    }

    #[tokio::test]
    async fn test_create_ignores_status() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let mut repo = make_repository("dashboards");
        repo.status = Some(RepositoryStatus {
            sync: SyncStatus {
                state: JobState::Success,
                ..Default::default()
            },
            ..Default::default()
        });

        let created = repos.create(&repo, &PostParams::default()).await.unwrap();
        let fetched = repos.get("dashboards", &GetParams::default()).await.unwrap();

        assert_eq!(created.status, None);
        assert_eq!(fetched.sync_state(), None);
    }

    #[tokio::test]
    async fn test_create_existing_is_conflict() {
        let fake = FakeProvisioningV0alpha1::with_objects([{
            let mut repo = make_repository("dashboards");
            repo.metadata.namespace = Some("default".to_string());
            repo
        }])
        .unwrap();
        let repos = fake.repositories("default");

        let err = repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        repos.delete("dashboards", &DeleteParams::default()).await.unwrap();
        let err = repos
            .get("dashboards", &GetParams::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(
            err,
            ProvisioningError::KubeError(kube::Error::Api(ref e)) if e.reason == "NotFound"
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let err = fake
            .repositories("default")
            .delete("missing", &DeleteParams::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_namespace_scoped() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        for name in ["charlie", "alpha", "bravo"] {
            repos
                .create(&make_repository(name), &PostParams::default())
                .await
                .unwrap();
        }
        fake.repositories("other")
            .create(&make_repository("delta"), &PostParams::default())
            .await
            .unwrap();

        let list = repos.list(&ListParams::default()).await.unwrap();

        assert_eq!(names(&list.items), vec!["alpha", "bravo", "charlie"]);
        assert_eq!(list.metadata.resource_version.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_list_with_label_selector() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos.create(&labelled("a", "platform"), &PostParams::default()).await.unwrap();
        repos.create(&labelled("b", "search"), &PostParams::default()).await.unwrap();

        let list = repos
            .list(&ListParams::default().labels("team=search"))
            .await
            .unwrap();

        assert_eq!(names(&list.items), vec!["b"]);
    }

    #[tokio::test]
    async fn test_update_bumps_generation() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let mut repo = repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        repo.spec.title = "Renamed".to_string();
        let updated = repos.update(&repo, &PostParams::default()).await.unwrap();

        assert_eq!(updated.spec.title, "Renamed");
        assert_eq!(updated.metadata.generation, Some(2));
        assert_ne!(updated.resource_version(), repo.resource_version());
    }

    #[tokio::test]
    async fn test_update_with_stale_version_is_conflict() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let stale = repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        let mut fresh = stale.clone();
        fresh.spec.title = "First".to_string();
        repos.update(&fresh, &PostParams::default()).await.unwrap();

        let mut late = stale;
        late.spec.title = "Second".to_string();
        let err = repos.update(&late, &PostParams::default()).await.unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_status_only_changes_status() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let mut repo = repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        repo.spec.title = "Ignored".to_string();
        repo.status = Some(RepositoryStatus {
            sync: SyncStatus {
                state: JobState::Working,
                job_id: Some("job-1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let updated = repos.update_status(&repo, &PostParams::default()).await.unwrap();

        assert_eq!(updated.spec.title, "dashboards dashboards");
        assert_eq!(updated.sync_state(), Some(JobState::Working));
        assert_eq!(fake.fake().actions().last().unwrap().subresource.as_deref(), Some("status"));
    }

    #[tokio::test]
    async fn test_merge_patch() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        let patched = repos
            .patch(
                "dashboards",
                &PatchParams::default(),
                &Patch::Merge(json!({"spec": {"description": "patched", "github": {"branch": "dev"}}})),
                None,
            )
            .await
            .unwrap();

        assert_eq!(patched.spec.description.as_deref(), Some("patched"));
        let github = patched.github().unwrap();
        assert_eq!(github.branch.as_deref(), Some("dev"));
        assert_eq!(github.owner, "acme");
    }

    #[tokio::test]
    async fn test_patch_status_subresource() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();

        let patched = repos
            .patch(
                "dashboards",
                &PatchParams::default(),
                &Patch::Merge(json!({"status": {"health": {"healthy": true}}})),
                Some("status"),
            )
            .await
            .unwrap();

        assert!(patched.is_healthy());
        assert_eq!(patched.metadata.generation, Some(1));
    }

    #[tokio::test]
    async fn test_apply_creates_then_merges() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let opts = ApplyOptions::new("repo-controller").force();

        let created = repos
            .apply(
                &RepositoryApplyConfiguration::new("dashboards", "default").with_spec(full_spec("Dashboards")),
                &opts,
            )
            .await
            .unwrap();
        assert_eq!(created.spec.title, "Dashboards");

        let updated = repos
            .apply(
                &RepositoryApplyConfiguration::new("dashboards", "default").with_spec(
                    RepositorySpecApplyConfiguration::new().with_github(
                        GitHubRepositoryConfigApplyConfiguration::new()
                            .with_branch("main")
                            .with_pull_request_linter(true),
                    ),
                ),
                &opts,
            )
            .await
            .unwrap();

        let github = updated.github().unwrap();
        assert_eq!(updated.spec.title, "Dashboards");
        assert_eq!(github.owner, "acme");
        assert_eq!(github.branch.as_deref(), Some("main"));
        assert_eq!(github.pull_request_linter, Some(true));
        assert_eq!(github.token, None);
    }

    #[tokio::test]
    async fn test_apply_status() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        let opts = ApplyOptions::new("repo-controller");
        repos
            .apply(
                &RepositoryApplyConfiguration::new("dashboards", "default").with_spec(full_spec("Dashboards")),
                &opts,
            )
            .await
            .unwrap();

        let updated = repos
            .apply_status(
                &RepositoryApplyConfiguration::new("dashboards", "default").with_status(
                    RepositoryStatusApplyConfiguration::new().with_sync(
                        SyncStatusApplyConfiguration::new()
                            .with_state(JobState::Success)
                            .with_job_id("job-9")
                            .with_finished(1_700_000_000_000)
                            .with_message(["synced 4 dashboards"]),
                    ),
                ),
                &opts,
            )
            .await
            .unwrap();

        let sync = &updated.status.as_ref().unwrap().sync;
        assert_eq!(sync.state, JobState::Success);
        assert_eq!(sync.job_id.as_deref(), Some("job-9"));
        assert_eq!(sync.finished, Some(1_700_000_000_000));
        assert_eq!(sync.message, vec!["synced 4 dashboards".to_string()]);
    }

    #[tokio::test]
    async fn test_apply_status_on_missing_is_not_found() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();

        let err = fake
            .repositories("default")
            .apply_status(
                &RepositoryApplyConfiguration::new("missing", "default")
                    .with_status(RepositoryStatusApplyConfiguration::new().with_observed_generation(1)),
                &ApplyOptions::new("repo-controller"),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_apply_without_name_sends_nothing() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");

        let err = repos
            .apply(
                &RepositoryApplyConfiguration::default(),
                &ApplyOptions::new("repo-controller"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisioningError::MissingName("repository")));
        assert!(fake.fake().actions().is_empty());
    }

    #[tokio::test]
    async fn test_delete_collection_with_selector() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos.create(&labelled("a", "platform"), &PostParams::default()).await.unwrap();
        repos.create(&labelled("b", "search"), &PostParams::default()).await.unwrap();
        repos.create(&labelled("c", "platform"), &PostParams::default()).await.unwrap();

        repos
            .delete_collection(&DeleteParams::default(), &ListParams::default().labels("team=platform"))
            .await
            .unwrap();

        let remaining = repos.list(&ListParams::default()).await.unwrap();
        assert_eq!(names(&remaining.items), vec!["b"]);
    }

    #[tokio::test]
    async fn test_watch_replays_changes_after_version() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("default");
        repos
            .create(&make_repository("alpha"), &PostParams::default())
            .await
            .unwrap();
        let start = repos
            .list(&ListParams::default())
            .await
            .unwrap()
            .metadata
            .resource_version
            .unwrap();
        repos
            .create(&make_repository("bravo"), &PostParams::default())
            .await
            .unwrap();
        repos.delete("alpha", &DeleteParams::default()).await.unwrap();

        let events: Vec<WatchEvent<Repository>> = repos
            .watch(&WatchParams::default(), &start)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let summary: Vec<(&str, String)> = events
            .iter()
            .map(|event| match event {
                WatchEvent::Added(r) => ("ADDED", r.name_any()),
                WatchEvent::Modified(r) => ("MODIFIED", r.name_any()),
                WatchEvent::Deleted(r) => ("DELETED", r.name_any()),
                WatchEvent::Bookmark(_) => ("BOOKMARK", String::new()),
                WatchEvent::Error(e) => ("ERROR", e.message.clone()),
            })
            .collect();

        assert_eq!(
            summary,
            vec![("ADDED", "bravo".to_string()), ("DELETED", "alpha".to_string())]
        );
    }

    #[tokio::test]
    async fn test_reaction_error_passes_through_unchanged() {
        let fake = FakeProvisioningV0alpha1::from_fake(
            FakeProvisioningV0alpha1::builder()
                .with_reaction(
                    Verb::List,
                    "repositories",
                    StatusError::new(503, "ServiceUnavailable", "etcd is unavailable"),
                )
                .build()
                .unwrap(),
        );

        let err = fake
            .repositories("default")
            .list(&ListParams::default())
            .await
            .unwrap_err();

        match err {
            ProvisioningError::KubeError(kube::Error::Api(e)) => {
                assert_eq!(e.code, 503);
                assert_eq!(e.reason, "ServiceUnavailable");
                assert_eq!(e.message, "etcd is unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_actions_record_each_call() {
        let fake = FakeProvisioningV0alpha1::new().unwrap();
        let repos = fake.repositories("grafana");
        repos
            .create(&make_repository("dashboards"), &PostParams::default())
            .await
            .unwrap();
        repos.get("dashboards", &GetParams::default()).await.unwrap();

        let actions = fake.fake().actions();
        let verbs: Vec<Verb> = actions.iter().map(|a| a.verb).collect();

        assert_eq!(verbs, vec![Verb::Create, Verb::Get]);
        assert!(actions.iter().all(|a| a.resource == "repositories"));
        assert!(actions.iter().all(|a| a.namespace.as_deref() == Some("grafana")));
    }
}
