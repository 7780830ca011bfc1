//! GitHub credential resolution.
//!
//! The credential is resolved once at process start and handed to
//! [`GitHubClient`](crate::github::GitHubClient) explicitly.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;

/// Environment variables checked for a token, highest priority first.
pub const TOKEN_ENV_VARS: [&str; 3] = ["GITHUB_TOKEN", "GH_TOKEN", "GITHUB_PAT"];

/// Keys tried, in order, when a token file holds a JSON object.
const TOKEN_KEYS: [&str; 7] = [
    "token",
    "Token",
    "PAT",
    "pat",
    "github_token",
    "githubToken",
    "value",
];

/// Bearer token for the GitHub API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Credential {
    /// Wrap a token. Blank input yields `None`.
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Credential(token.to_string()))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// First non-blank token among [`TOKEN_ENV_VARS`].
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Credential::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|name| lookup(name).and_then(|v| Credential::new(&v)))
    }

    /// Read a token file. The file may hold the raw token or a JSON secret
    /// payload (object or array) wrapping it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_secret(&text).map_err(|reason| ConfigError::InvalidCredential {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Extract a token from secret text.
    pub fn parse_secret(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("secret is empty".to_string());
        }

        if text.starts_with('{') || text.starts_with('[') {
            if let Ok(payload) = serde_json::from_str::<Value>(text) {
                return token_from_payload(&payload).ok_or_else(|| {
                    "JSON secret has no token field (expected one of: token, github_token, pat)"
                        .to_string()
                });
            }
        }

        Credential::new(text).ok_or_else(|| "secret is empty".to_string())
    }
}

fn token_from_payload(payload: &Value) -> Option<Credential> {
    let non_blank = |v: &Value| v.as_str().and_then(Credential::new);
    match payload {
        Value::Object(map) => TOKEN_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(non_blank))
            .or_else(|| map.values().find_map(non_blank)),
        Value::Array(items) => items.iter().find_map(non_blank),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_priority_first_match_wins() {
        let cred = Credential::from_lookup(lookup(&[
            ("GH_TOKEN", "second"),
            ("GITHUB_TOKEN", "first"),
        ]));
        assert_eq!(cred.unwrap().token(), "first");

        let cred = Credential::from_lookup(lookup(&[
            ("GITHUB_PAT", "third"),
            ("GH_TOKEN", "second"),
        ]));
        assert_eq!(cred.unwrap().token(), "second");
    }

    #[test]
    fn test_blank_env_value_is_skipped() {
        let cred =
            Credential::from_lookup(lookup(&[("GITHUB_TOKEN", "  "), ("GITHUB_PAT", "pat")]));
        assert_eq!(cred.unwrap().token(), "pat");
    }

    #[test]
    fn test_no_env_yields_none() {
        assert!(Credential::from_lookup(lookup(&[])).is_none());
    }

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(Credential::new("abc").unwrap().bearer(), "Bearer abc");
    }

    #[test]
    fn test_debug_is_redacted() {
        let cred = Credential::new("supersecret").unwrap();
        assert!(!format!("{cred:?}").contains("supersecret"));
    }

    #[test]
    fn test_parse_secret_raw_token() {
        let cred = Credential::parse_secret(" ghp_raw \n").unwrap();
        assert_eq!(cred.token(), "ghp_raw");
    }

    #[test]
    fn test_parse_secret_json_prefers_known_keys() {
        let cred =
            Credential::parse_secret(r#"{"other": "x", "github_token": "ghp_json"}"#).unwrap();
        assert_eq!(cred.token(), "ghp_json");
    }

    #[test]
    fn test_parse_secret_json_falls_back_to_any_string() {
        let cred = Credential::parse_secret(r#"{"n": 1, "whatever": "ghp_any"}"#).unwrap();
        assert_eq!(cred.token(), "ghp_any");
    }

    #[test]
    fn test_parse_secret_json_array() {
        let cred = Credential::parse_secret(r#"["", "ghp_arr"]"#).unwrap();
        assert_eq!(cred.token(), "ghp_arr");
    }

    #[test]
    fn test_parse_secret_json_without_token_is_error() {
        assert!(Credential::parse_secret(r#"{"n": 1}"#).is_err());
    }

    #[test]
    fn test_parse_secret_brace_but_not_json_is_verbatim() {
        assert_eq!(Credential::parse_secret("{notjson").unwrap().token(), "{notjson");
    }

    #[test]
    fn test_parse_secret_empty_is_error() {
        assert!(Credential::parse_secret("\n").is_err());
    }

    #[test]
    fn test_from_file_reports_invalid_credential() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "").unwrap();
        let err = Credential::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCredential { .. }));
    }

    #[test]
    fn test_from_file_missing_names_the_credential_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gh-token");
        let err = Credential::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialRead { .. }));
        let msg = err.to_string();
        assert!(msg.contains("credential file"));
        assert!(msg.contains("gh-token"));
        assert!(!msg.contains("read config"));
    }
}
