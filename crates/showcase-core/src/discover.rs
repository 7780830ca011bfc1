//! Project selection from a user's repository listing.
//!
//! Used when no curated project list exists: the most recently pushed
//! repositories of one account become the output entries.

use chrono::{DateTime, Utc};

use crate::config::ProjectDescriptor;
use crate::github::RemoteRepositoryRecord;
use crate::reconcile::{build_entry, ProjectOutputEntry};

/// Default number of repositories kept by discovery.
pub const DEFAULT_DISCOVER_LIMIT: usize = 5;

fn pushed_at(record: &RemoteRepositoryRecord) -> Option<DateTime<Utc>> {
    record
        .pushed_at
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Most recently pushed first, keep `limit`. Records without a usable
/// `pushed_at` sort last; ties keep listing order.
pub fn select_recent(
    mut records: Vec<RemoteRepositoryRecord>,
    limit: usize,
) -> Vec<RemoteRepositoryRecord> {
    records.sort_by_key(|record| std::cmp::Reverse(pushed_at(record)));
    records.truncate(limit);
    records
}

/// Descriptor implied by a listed record: its full name, no overrides.
pub fn descriptor_for(record: &RemoteRepositoryRecord) -> ProjectDescriptor {
    let repo = record
        .full_name
        .as_deref()
        .or(record.name.as_deref())
        .unwrap_or_default();
    ProjectDescriptor::new(repo)
}

/// Reconcile listed records directly; no per-repository request is made.
pub fn entries_from_listing(records: &[RemoteRepositoryRecord]) -> Vec<ProjectOutputEntry> {
    records
        .iter()
        .map(|record| build_entry(&descriptor_for(record), Some(record), None))
        .collect()
}
