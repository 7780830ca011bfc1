//! GitHub REST API access.
//!
//! [`RepositoryFetcher`] is the seam the aggregator depends on;
//! [`GitHubClient`] is the real implementation over `reqwest`. Every request
//! is attempted exactly once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::credential::Credential;
use crate::error::{FetchError, SyncError};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type requesting the structured JSON representation.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Pinned REST API version.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Snapshot of a repository as returned by `GET /repos/{owner}/{name}`.
///
/// Only the fields the output needs are kept; anything else in the payload
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepositoryRecord {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub homepage: Option<String>,
    pub stargazers_count: Option<u64>,
    pub language: Option<String>,
    /// `null`, a missing field, or a non-array all normalize to empty.
    #[serde(default, deserialize_with = "topics_or_empty")]
    pub topics: Vec<String>,
    pub pushed_at: Option<String>,
}

fn topics_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(topic) => Some(topic),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Injectable source of repository records.
///
/// Implement this to plug in the GitHub API or test stubs.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Fetch the record for `repo` (`owner/name`).
    async fn fetch_repository(&self, repo: &str) -> Result<RemoteRepositoryRecord, FetchError>;
}

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without trailing slash.
    pub api_url: String,
    pub user_agent: String,
    pub credential: Option<Credential>,
    /// `None` leaves timing out to the network stack.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            credential: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        ClientConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `showcase-sync/<version>`.
pub fn default_user_agent() -> String {
    format!("showcase-sync/{}", env!("CARGO_PKG_VERSION"))
}

/// GitHub REST client.
pub struct GitHubClient {
    config: ClientConfig,
    http: Client,
}

impl GitHubClient {
    pub fn new(config: ClientConfig) -> Result<Self, SyncError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        Ok(GitHubClient { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, GITHUB_API_VERSION);
        match &self.config.credential {
            Some(credential) => request.header(AUTHORIZATION, credential.bearer()),
            None => request,
        }
    }

    /// Issue one GET and return the body of a 2xx response. `label` names
    /// the lookup in errors.
    async fn get_text(&self, label: &str, url: &str) -> Result<String, FetchError> {
        debug!(url = %url, "GET");
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                repo: label.to_string(),
                message: error_chain(&e),
            })?;

        let status = response.status();
        // A body that cannot be read is still reported with the status.
        let body = response.text().await;

        if !status.is_success() {
            return Err(FetchError::Status {
                repo: label.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: body.unwrap_or_default(),
            });
        }

        body.map_err(|e| FetchError::Transport {
            repo: label.to_string(),
            message: error_chain(&e),
        })
    }

    /// Repositories owned by `user`, most recently updated first as the API
    /// returns them (one page of up to 100).
    ///
    /// `user` must be a valid GitHub login; anything else is rejected before
    /// a request is sent.
    pub async fn list_user_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RemoteRepositoryRecord>, FetchError> {
        check_login(user)?;
        let label = format!("users/{user}");
        let url = format!(
            "{}/users/{}/repos?per_page=100&sort=updated",
            self.config.api_url, user
        );
        let body = self.get_text(&label, &url).await?;

        let payload: Value = serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            repo: label.clone(),
            message: e.to_string(),
        })?;
        if !payload.is_array() {
            return Err(FetchError::Decode {
                repo: label,
                message: "expected a JSON array of repositories".to_string(),
            });
        }
        serde_json::from_value(payload).map_err(|e| FetchError::Decode {
            repo: label,
            message: e.to_string(),
        })
    }
}

/// Longest login GitHub accepts.
const MAX_LOGIN_LEN: usize = 39;

/// GitHub logins are ASCII alphanumerics and single inner hyphens.
fn check_login(login: &str) -> Result<(), FetchError> {
    let invalid = |reason: &str| {
        Err(FetchError::InvalidIdentifier {
            repo: login.to_string(),
            reason: reason.to_string(),
        })
    };
    if login.is_empty() || login.len() > MAX_LOGIN_LEN {
        return invalid("login must be 1 to 39 characters");
    }
    if !login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return invalid("login may only contain ASCII letters, digits and hyphens");
    }
    if login.starts_with('-') || login.ends_with('-') || login.contains("--") {
        return invalid("hyphens must separate other characters");
    }
    Ok(())
}

#[async_trait]
impl RepositoryFetcher for GitHubClient {
    async fn fetch_repository(&self, repo: &str) -> Result<RemoteRepositoryRecord, FetchError> {
        let url = format!("{}/repos/{}", self.config.api_url, repo);
        let body = self.get_text(repo, &url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            repo: repo.to_string(),
            message: e.to_string(),
        })
    }
}

/// Render an error with its source chain, e.g. `error sending request: dns error: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_github_payload() {
        let raw = r#"{
            "id": 1, "name": "widget", "full_name": "acme/widget",
            "description": "A widget", "html_url": "https://x/widget",
            "homepage": "", "stargazers_count": 42, "language": "X",
            "topics": ["a", "b"], "pushed_at": "2024-01-01T00:00:00Z",
            "owner": {"login": "acme"}
        }"#;
        let record: RemoteRepositoryRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.name.as_deref(), Some("widget"));
        assert_eq!(record.stargazers_count, Some(42));
        assert_eq!(record.topics, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(record.pushed_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(record.homepage.as_deref(), Some(""));
    }

    #[test]
    fn test_null_topics_normalize_to_empty() {
        let record: RemoteRepositoryRecord =
            serde_json::from_str(r#"{"name": "w", "topics": null}"#).unwrap();
        assert!(record.topics.is_empty());
    }

    #[test]
    fn test_missing_topics_normalize_to_empty() {
        let record: RemoteRepositoryRecord = serde_json::from_str(r#"{"name": "w"}"#).unwrap();
        assert!(record.topics.is_empty());
        assert!(record.description.is_none());
    }

    #[test]
    fn test_non_array_topics_normalize_to_empty() {
        let record: RemoteRepositoryRecord =
            serde_json::from_str(r#"{"topics": "rust"}"#).unwrap();
        assert!(record.topics.is_empty());
    }

    #[test]
    fn test_check_login_accepts_real_logins() {
        let longest = "x".repeat(MAX_LOGIN_LEN);
        for login in ["octocat", "a", "rust-lang", "User123", longest.as_str()] {
            assert!(check_login(login).is_ok(), "{login}");
        }
    }

    #[test]
    fn test_check_login_rejects_path_and_query_characters() {
        for login in ["", "a/b", "x?y", "a#b", "a b", "-lead", "trail-", "a--b", "ü"] {
            let err = check_login(login).unwrap_err();
            assert!(matches!(err, FetchError::InvalidIdentifier { .. }), "{login}");
        }
        assert!(check_login(&"x".repeat(MAX_LOGIN_LEN + 1)).is_err());
    }

    #[test]
    fn test_client_config_trims_trailing_slash() {
        let config = ClientConfig::new("http://127.0.0.1:9999/");
        assert_eq!(config.api_url, "http://127.0.0.1:9999");
        assert!(config.user_agent.starts_with("showcase-sync/"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_client_builds_without_credential() {
        let client = GitHubClient::new(ClientConfig::default()).unwrap();
        assert!(client.config().credential.is_none());
        assert_eq!(client.config().api_url, DEFAULT_API_URL);
    }
}
