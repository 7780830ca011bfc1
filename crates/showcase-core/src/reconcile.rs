//! Reconciliation of a configured project with its fetched record.
//!
//! [`build_entry`] is total: any combination of descriptor, optional record
//! and optional error yields exactly one [`ProjectOutputEntry`].
//!
//! A string counts as empty when it is absent or contains only whitespace.
//! `null` in the fetched payload is the same as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProjectDescriptor;
use crate::error::FetchError;
use crate::github::RemoteRepositoryRecord;

/// Whether the entry was built from a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Ok,
    Error,
}

/// Per-entry fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub status: SyncState,
    pub status_message: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl SyncStatus {
    pub fn is_ok(&self) -> bool {
        self.status == SyncState::Ok
    }
}

/// One project in the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOutputEntry {
    pub repo: String,
    pub display_name: String,
    pub summary: String,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub homepage: Option<String>,
    pub stars: Option<u64>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub last_push: Option<String>,
    pub sync: SyncStatus,
}

/// First candidate that is present and not blank.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Display name: override, then remote name, then the identifier's tail.
pub fn resolve_display_name(
    descriptor: &ProjectDescriptor,
    record: Option<&RemoteRepositoryRecord>,
) -> String {
    first_non_empty([
        descriptor.display_name.as_deref(),
        record.and_then(|r| r.name.as_deref()),
    ])
    .unwrap_or_else(|| descriptor.fallback_name())
    .to_string()
}

/// Summary: override, then remote description, then `""`.
pub fn resolve_summary(
    descriptor: &ProjectDescriptor,
    record: Option<&RemoteRepositoryRecord>,
) -> String {
    first_non_empty([
        descriptor.summary.as_deref(),
        record.and_then(|r| r.description.as_deref()),
    ])
    .unwrap_or_default()
    .to_string()
}

/// Homepage: override, then remote homepage, then none.
pub fn resolve_homepage(
    descriptor: &ProjectDescriptor,
    record: Option<&RemoteRepositoryRecord>,
) -> Option<String> {
    first_non_empty([
        descriptor.homepage.as_deref(),
        record.and_then(|r| r.homepage.as_deref()),
    ])
    .map(str::to_string)
}

/// Build the output entry, stamping `fetchedAt` with the current time.
pub fn build_entry(
    descriptor: &ProjectDescriptor,
    record: Option<&RemoteRepositoryRecord>,
    error: Option<&FetchError>,
) -> ProjectOutputEntry {
    build_entry_at(descriptor, record, error, Utc::now())
}

/// [`build_entry`] with an explicit `fetchedAt`.
pub fn build_entry_at(
    descriptor: &ProjectDescriptor,
    record: Option<&RemoteRepositoryRecord>,
    error: Option<&FetchError>,
    fetched_at: DateTime<Utc>,
) -> ProjectOutputEntry {
    let sync = match error {
        Some(err) => SyncStatus {
            status: SyncState::Error,
            status_message: Some(err.to_string()),
            fetched_at,
        },
        None => SyncStatus {
            status: SyncState::Ok,
            status_message: None,
            fetched_at,
        },
    };

    ProjectOutputEntry {
        repo: descriptor.repo.clone(),
        display_name: resolve_display_name(descriptor, record),
        summary: resolve_summary(descriptor, record),
        description: record.and_then(|r| r.description.clone()),
        html_url: record.and_then(|r| r.html_url.clone()),
        homepage: resolve_homepage(descriptor, record),
        stars: record.and_then(|r| r.stargazers_count),
        language: record.and_then(|r| r.language.clone()),
        topics: record.map(|r| r.topics.clone()).unwrap_or_default(),
        last_push: record.and_then(|r| r.pushed_at.clone()),
        sync,
    }
}

/// Fold a fetch outcome into an entry.
pub fn reconcile(
    descriptor: &ProjectDescriptor,
    outcome: &Result<RemoteRepositoryRecord, FetchError>,
) -> ProjectOutputEntry {
    match outcome {
        Ok(record) => build_entry(descriptor, Some(record), None),
        Err(err) => build_entry(descriptor, None, Some(err)),
    }
}
