// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use kube::api::{DeleteParams, GetParams, ListParams, WatchEvent, WatchParams};
use kube::ResourceExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use provisioning_client::applyconfiguration::{
    RepositoryApplyConfiguration, RepositoryStatusApplyConfiguration, SyncStatusApplyConfiguration,
};
use provisioning_client::client::{ApplyOptions, ProvisioningV0alpha1Client, RepositoriesGetter, RepositoryInterface};
use provisioning_client::config::Config;
use provisioning_client::error::ProvisioningError;
use provisioning_client::types::{JobState, Repository};

/// Manage Grafana provisioning repositories
#[derive(Parser)]
#[command(name = "provisioning-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Namespace to operate in, overrides PROVISIONING_NAMESPACE
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories
    List {
        /// Label selector, e.g. team=platform
        #[arg(short = 'l', long)]
        selector: Option<String>,
    },

    /// Show a repository as YAML
    Get { name: String },

    /// Delete a repository
    Delete { name: String },

    /// Stream repository changes
    Watch {
        /// Resource version to start from, 0 replays current objects
        #[arg(long, default_value = "0")]
        resource_version: String,
    },

    /// Server-side apply a Repository manifest
    Apply {
        /// Path to the manifest YAML file
        file: String,

        /// Take ownership of conflicting fields
        #[arg(long)]
        force: bool,

        /// Validate without persisting
        #[arg(long)]
        dry_run: bool,
    },

    /// Report the state of a sync job on a repository
    SyncStatus {
        name: String,

        #[arg(long)]
        state: JobState,

        #[arg(long)]
        job: Option<String>,

        /// Unix epoch milliseconds
        #[arg(long)]
        started: Option<i64>,

        /// Unix epoch milliseconds, defaults to now for finished states
        #[arg(long)]
        finished: Option<i64>,

        /// Unix epoch milliseconds
        #[arg(long)]
        scheduled: Option<i64>,

        /// May be repeated
        #[arg(long)]
        message: Vec<String>,

        #[arg(long)]
        hash: Option<String>,
    },
}

async fn with_timeout<T, F>(timeout: Duration, fut: F) -> provisioning_client::Result<T>
where
    F: Future<Output = provisioning_client::Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ProvisioningError::Timeout(timeout))?
}

fn print_row(repo: &Repository) {
    let state = repo
        .sync_state()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<32} {:<8} {:<10} {}",
        repo.name_any(),
        serde_json::to_value(repo.spec.repository_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        state,
        repo.spec.title
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    debug!(
        "Configuration loaded: namespace={}, field_manager={}, timeout={:?}",
        config.namespace, config.field_manager, config.request_timeout
    );

    let client = ProvisioningV0alpha1Client::try_default()
        .await
        .context("Failed to connect to Kubernetes cluster")?;
    let repos = client.repositories(&config.namespace);
    let timeout = config.request_timeout;

    match cli.command {
        Commands::List { selector } => {
            let mut lp = ListParams::default();
            if let Some(selector) = selector.as_deref() {
                lp = lp.labels(selector);
            }
            let list = with_timeout(timeout, repos.list(&lp)).await?;
            for repo in &list.items {
                print_row(repo);
            }
        }
        Commands::Get { name } => {
            let repo = with_timeout(timeout, repos.get(&name, &GetParams::default())).await?;
            print!("{}", serde_yaml::to_string(&repo)?);
        }
        Commands::Delete { name } => {
            with_timeout(timeout, repos.delete(&name, &DeleteParams::default())).await?;
            info!("Deleted repository {}/{}", config.namespace, name);
        }
        Commands::Watch { resource_version } => {
            let mut stream =
                with_timeout(timeout, repos.watch(&WatchParams::default(), &resource_version)).await?;
            while let Some(event) = stream.next().await {
                match event? {
                    WatchEvent::Added(repo) => println!("ADDED     {}", repo.name_any()),
                    WatchEvent::Modified(repo) => println!("MODIFIED  {}", repo.name_any()),
                    WatchEvent::Deleted(repo) => println!("DELETED   {}", repo.name_any()),
                    WatchEvent::Bookmark(bookmark) => {
                        debug!("Bookmark at {}", bookmark.metadata.resource_version)
                    }
                    WatchEvent::Error(err) => anyhow::bail!("Watch failed: {}", err),
                }
            }
        }
        Commands::Apply { file, force, dry_run } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file))?;
            let mut manifest: RepositoryApplyConfiguration =
                serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse {}", file))?;
            if manifest.namespace().is_none() {
                manifest.metadata = Some(
                    manifest
                        .metadata
                        .take()
                        .unwrap_or_default()
                        .with_namespace(config.namespace.as_str()),
                );
            }

            let mut opts = ApplyOptions::new(config.field_manager.as_str());
            if force {
                opts = opts.force();
            }
            if dry_run {
                opts = opts.dry_run();
            }
            let repo = with_timeout(timeout, repos.apply(&manifest, &opts)).await?;
            info!("Applied repository {}/{}", config.namespace, repo.name_any());
        }
        Commands::SyncStatus {
            name,
            state,
            job,
            started,
            finished,
            scheduled,
            message,
            hash,
        } => {
            let mut sync = SyncStatusApplyConfiguration::new().with_state(state);
            if let Some(job) = job {
                sync = sync.with_job_id(job);
            }
            if let Some(started) = started {
                sync = sync.with_started(started);
            }
            match finished {
                Some(finished) => sync = sync.with_finished(finished),
                None if state.is_finished() => {
                    sync = sync.with_finished(chrono::Utc::now().timestamp_millis())
                }
                None => {}
            }
            if let Some(scheduled) = scheduled {
                sync = sync.with_scheduled(scheduled);
            }
            if !message.is_empty() {
                sync = sync.with_message(message);
            }
            if let Some(hash) = hash {
                sync = sync.with_hash(hash);
            }

            let status = RepositoryApplyConfiguration::new(name.as_str(), config.namespace.as_str())
                .with_status(RepositoryStatusApplyConfiguration::new().with_sync(sync));
            let opts = ApplyOptions::new(config.field_manager.as_str()).force();
            let repo = with_timeout(timeout, repos.apply_status(&status, &opts)).await?;
            info!("Repository {} sync state is now {}", repo.name_any(), state);
        }
    }

    Ok(())
}
