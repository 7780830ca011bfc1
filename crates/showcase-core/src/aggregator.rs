//! Concurrent fetch of every configured project.
//!
//! [`ProjectAggregator`] fans out one task per descriptor and fans back in
//! by input index, so the result order always matches the configuration
//! regardless of completion order.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ProjectDescriptor;
use crate::error::FetchError;
use crate::github::RepositoryFetcher;
use crate::reconcile::{build_entry, reconcile, ProjectOutputEntry};

/// Fetches and reconciles a project list.
pub struct ProjectAggregator {
    fetcher: Arc<dyn RepositoryFetcher>,
}

impl ProjectAggregator {
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch all `projects` concurrently and return one entry per descriptor,
    /// in input order.
    ///
    /// Never fails: a fetch error, or a task that panics, becomes a degraded
    /// entry for that project only.
    pub async fn collect(&self, projects: &[ProjectDescriptor]) -> Vec<ProjectOutputEntry> {
        let mut join_set = JoinSet::new();
        for (idx, descriptor) in projects.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            join_set.spawn(async move {
                let outcome = fetcher.fetch_repository(&descriptor.repo).await;
                if let Err(err) = &outcome {
                    warn!(
                        repo = %descriptor.repo,
                        error = %err,
                        "fetch failed, writing degraded entry"
                    );
                }
                (idx, reconcile(&descriptor, &outcome))
            });
        }

        let mut slots: Vec<Option<ProjectOutputEntry>> = vec![None; projects.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, entry)) => slots[idx] = Some(entry),
                Err(e) => debug!(error = %e, "fetch task did not complete"),
            }
        }

        projects
            .iter()
            .zip(slots)
            .map(|(descriptor, slot)| {
                slot.unwrap_or_else(|| {
                    let err = FetchError::TaskFailed {
                        repo: descriptor.repo.clone(),
                        message: "task panicked or was cancelled".to_string(),
                    };
                    warn!(
                        repo = %descriptor.repo,
                        error = %err,
                        "fetch failed, writing degraded entry"
                    );
                    build_entry(descriptor, None, Some(&err))
                })
            })
            .collect()
    }
}
