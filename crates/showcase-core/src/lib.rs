//! Showcase Sync core library
//!
//! Builds the `projects.json` document behind a static portfolio page:
//! a configured list of repositories is fetched from the GitHub REST API
//! concurrently, each result is reconciled with its configured overrides,
//! and the ordered entries are written as one JSON document.

pub mod aggregator;
pub mod config;
pub mod credential;
pub mod discover;
pub mod error;
pub mod github;
pub mod reconcile;
pub mod reporting;
pub mod sync;
pub mod telemetry;

pub use aggregator::ProjectAggregator;
pub use config::{load_projects, parse_projects, ProjectDescriptor};
pub use credential::{Credential, TOKEN_ENV_VARS};
pub use discover::{entries_from_listing, select_recent, DEFAULT_DISCOVER_LIMIT};
pub use error::{ConfigError, FetchError, OutputError, Result, SyncError};
pub use github::{
    default_user_agent, ClientConfig, GitHubClient, RemoteRepositoryRecord, RepositoryFetcher,
    DEFAULT_API_URL, GITHUB_API_VERSION, GITHUB_MEDIA_TYPE,
};
pub use reconcile::{
    build_entry, build_entry_at, first_non_empty, reconcile, ProjectOutputEntry, SyncState,
    SyncStatus,
};
pub use reporting::{render_document, write_document, OutputDocument, OutputStyle, SOURCE_LABEL};
pub use sync::{run_discover, run_sync, DiscoverSettings, SyncSettings, SyncSummary};
pub use telemetry::init_tracing;

/// Showcase Sync version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
