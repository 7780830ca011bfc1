//! Project list loading.
//!
//! The project list is a JSON document with a top-level `projects` array:
//!
//! ```json
//! {
//!   "projects": [
//!     { "repo": "acme/widget" },
//!     { "repo": "acme/gadget", "displayName": "Gadget", "summary": "Does things" }
//!   ]
//! }
//! ```
//!
//! Any failure here is a [`ConfigError`] and aborts the run before a single
//! request is made.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;

/// One configured project to track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Repository identifier in `owner/name` form.
    pub repo: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl ProjectDescriptor {
    pub fn new(repo: &str) -> Self {
        ProjectDescriptor {
            repo: repo.to_string(),
            display_name: None,
            summary: None,
            homepage: None,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_homepage(mut self, homepage: &str) -> Self {
        self.homepage = Some(homepage.to_string());
        self
    }

    /// Name derived from the identifier alone: the part after the last `/`,
    /// or the whole identifier when there is no separator (or nothing after it).
    pub fn fallback_name(&self) -> &str {
        match self.repo.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => &self.repo,
        }
    }
}

/// Read and parse the project list at `path`.
pub fn load_projects(path: &Path) -> Result<Vec<ProjectDescriptor>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_projects(path, &text)
}

/// Parse a project list already read into memory. `path` is only used for
/// error messages.
pub fn parse_projects(path: &Path, text: &str) -> Result<Vec<ProjectDescriptor>, ConfigError> {
    let root: Value = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let projects = root
        .get("projects")
        .ok_or_else(|| ConfigError::MissingProjects {
            path: path.to_path_buf(),
        })?;
    let items = projects
        .as_array()
        .ok_or_else(|| ConfigError::ProjectsNotSequence {
            path: path.to_path_buf(),
        })?;

    let mut descriptors = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let invalid = |reason: String| ConfigError::InvalidDescriptor {
            path: path.to_path_buf(),
            index,
            reason,
        };
        if !item.is_object() {
            return Err(invalid("expected an object".to_string()));
        }
        let descriptor: ProjectDescriptor =
            serde_json::from_value(item.clone()).map_err(|e| invalid(e.to_string()))?;
        if descriptor.repo.trim().is_empty() {
            return Err(invalid("`repo` must not be empty".to_string()));
        }
        descriptors.push(descriptor);
    }

    debug!(path = ?path, count = descriptors.len(), "loaded project list");
    Ok(descriptors)
}
