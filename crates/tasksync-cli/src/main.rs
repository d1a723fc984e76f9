//! # tasksync
//!
//! One sync run against the configured Notion workspace: sweep completed
//! tasks, then roll up projects and republish the spotlight.
//!
//! Configured through the environment (see `tasksync_core::config`). Exits
//! non-zero when the run could not start or any step failed.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tasksync_core::app::{BuildError, SyncBuilder};
use tasksync_core::config::{SyncSettings, load_settings};
use tasksync_core::domain::{ErrorKind, SyncError};
use tasksync_core::impls::NotionStore;
use tasksync_core::observability::{RunSummary, init_subscriber};
use tracing::{debug, error, info, warn};

async fn run(settings: SyncSettings) -> Result<RunSummary> {
    let store = NotionStore::new(&settings.notion).context("invalid Notion settings")?;
    let sync = SyncBuilder::from_settings(&settings)
        .store(Arc::new(store))
        .build()
        .context("invalid sync settings")?;

    info!(
        tasks = %sync.databases().tasks,
        projects = %sync.databases().projects,
        spotlight = %sync.databases().spotlight,
        concurrency = settings.sweep.concurrency,
        "starting sync"
    );

    let report = sync.run().await.context("sync run aborted")?;
    Ok(RunSummary::from_report(&report))
}

/// Classify a failed run for the exit log.
fn error_kind(e: &anyhow::Error) -> ErrorKind {
    if let Some(err) = e.downcast_ref::<SyncError>() {
        return err.kind();
    }
    match e.downcast_ref::<BuildError>() {
        Some(BuildError::MissingStore) => ErrorKind::Internal,
        _ => ErrorKind::Configuration,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (settings, rejected) = load_settings();
    init_subscriber(&settings.log_level);
    for err in &rejected {
        warn!(error = %err, "ignoring environment override");
    }
    debug!(?settings, "settings loaded");

    match run(settings).await {
        Ok(summary) => {
            summary.log();
            if summary.is_clean() {
                ExitCode::SUCCESS
            } else {
                error!(failed = summary.failures.len(), "sync finished with failed steps");
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            let chain = format!("{e:#}");
            error!(kind = ?error_kind(&e), error = %chain, "sync failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasksync_core::domain::{ConfigError, StoreError};

    #[test]
    fn run_errors_are_classified() {
        let remote = anyhow::Error::new(SyncError::Store(StoreError::Injected("boom".into())))
            .context("sync run aborted");
        assert_eq!(error_kind(&remote), ErrorKind::Remote);

        let worker = anyhow::Error::new(SyncError::Worker("panicked".into()));
        assert_eq!(error_kind(&worker), ErrorKind::Internal);

        let token =
            anyhow::Error::new(ConfigError::MissingToken).context("invalid Notion settings");
        assert_eq!(error_kind(&token), ErrorKind::Configuration);

        let ids = anyhow::Error::new(BuildError::Config(ConfigError::MissingDatabaseId("tasks")));
        assert_eq!(error_kind(&ids), ErrorKind::Configuration);

        let store = anyhow::Error::new(BuildError::MissingStore);
        assert_eq!(error_kind(&store), ErrorKind::Internal);
    }
}
