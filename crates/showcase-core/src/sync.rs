//! Run drivers: load, fetch, reconcile, write.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::aggregator::ProjectAggregator;
use crate::config::load_projects;
use crate::discover::{entries_from_listing, select_recent};
use crate::error::Result;
use crate::github::{GitHubClient, RepositoryFetcher};
use crate::reporting::{write_document, OutputDocument, OutputStyle};

/// Inputs of a sync run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub style: OutputStyle,
}

/// Inputs of a discover run.
#[derive(Debug, Clone)]
pub struct DiscoverSettings {
    pub user: String,
    pub limit: usize,
    pub output_path: PathBuf,
    pub style: OutputStyle,
}

/// What a run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output: PathBuf,
}

impl SyncSummary {
    fn from_document(document: &OutputDocument, output: PathBuf) -> Self {
        SyncSummary {
            total: document.projects.len(),
            succeeded: document.ok_count(),
            failed: document.error_count(),
            output,
        }
    }
}

/// Load the project list, fetch every project concurrently and write the
/// output document.
///
/// Only configuration and output errors are returned; per-project fetch
/// failures are written as degraded entries. Nothing is written when the
/// configuration cannot be loaded.
pub async fn run_sync(
    settings: &SyncSettings,
    fetcher: Arc<dyn RepositoryFetcher>,
) -> Result<SyncSummary> {
    let projects = load_projects(&settings.config_path)?;
    info!(
        config = ?settings.config_path,
        projects = projects.len(),
        "syncing projects"
    );

    let entries = ProjectAggregator::new(fetcher).collect(&projects).await;
    let document = OutputDocument::new(entries);
    write_document(&settings.output_path, &document, settings.style)?;

    let summary = SyncSummary::from_document(&document, settings.output_path.clone());
    info!(
        output = ?summary.output,
        failed = summary.failed,
        "wrote {} project entries",
        summary.total
    );
    Ok(summary)
}

/// List `settings.user`'s repositories, keep the most recently pushed and
/// write them as the output document. A failed listing is fatal.
pub async fn run_discover(
    settings: &DiscoverSettings,
    client: &GitHubClient,
) -> Result<SyncSummary> {
    let listed = client.list_user_repositories(&settings.user).await?;
    info!(user = %settings.user, listed = listed.len(), "listed repositories");

    let selected = select_recent(listed, settings.limit);
    let document = OutputDocument::new(entries_from_listing(&selected));
    write_document(&settings.output_path, &document, settings.style)?;

    let summary = SyncSummary::from_document(&document, settings.output_path.clone());
    info!(output = ?summary.output, "wrote {} project entries", summary.total);
    Ok(summary)
}
