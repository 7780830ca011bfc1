//! The generated `projects.json` document and how it reaches disk.
//!
//! [`OutputDocument`] wraps the reconciled entries with a generation
//! timestamp and [`SOURCE_LABEL`]. [`write_document`] replaces the target
//! file in one rename.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::OutputError;
use crate::reconcile::ProjectOutputEntry;

/// Value of the `source` key in every generated document.
pub const SOURCE_LABEL: &str = "github-api";

/// The document consumed by the front-end page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub projects: Vec<ProjectOutputEntry>,
}

impl OutputDocument {
    /// Wrap `projects` with the current time and the constant source label.
    pub fn new(projects: Vec<ProjectOutputEntry>) -> Self {
        Self::generated_at(projects, Utc::now())
    }

    pub fn generated_at(projects: Vec<ProjectOutputEntry>, generated_at: DateTime<Utc>) -> Self {
        OutputDocument {
            generated_at,
            source: SOURCE_LABEL.to_string(),
            projects,
        }
    }

    pub fn ok_count(&self) -> usize {
        self.projects.iter().filter(|p| p.sync.is_ok()).count()
    }

    pub fn error_count(&self) -> usize {
        self.projects.len() - self.ok_count()
    }
}

/// Serialized layout of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Two-space indented.
    #[default]
    Pretty,
    Compact,
}

/// Serialize `document`. Always ends with a single newline.
pub fn render_document(
    document: &OutputDocument,
    style: OutputStyle,
) -> Result<String, OutputError> {
    let mut content = match style {
        OutputStyle::Pretty => serde_json::to_string_pretty(document)?,
        OutputStyle::Compact => serde_json::to_string(document)?,
    };
    content.push('\n');
    Ok(content)
}

/// Write `document` to `path`, replacing whatever was there.
///
/// The content goes to a temporary file next to `path` first and is then
/// renamed over it, so readers never observe a partial document.
pub fn write_document(
    path: &Path,
    document: &OutputDocument,
    style: OutputStyle,
) -> Result<(), OutputError> {
    let content = render_document(document, style)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| OutputError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectDescriptor;
    use crate::error::FetchError;
    use crate::reconcile::build_entry_at;
    use serde_json::json;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    fn sample_document() -> OutputDocument {
        let err = FetchError::Transport {
            repo: "acme/gadget".to_string(),
            message: "connection reset".to_string(),
        };
        OutputDocument::generated_at(
            vec![
                build_entry_at(&ProjectDescriptor::new("acme/widget"), None, None, fixed_time()),
                build_entry_at(
                    &ProjectDescriptor::new("acme/gadget"),
                    None,
                    Some(&err),
                    fixed_time(),
                ),
            ],
            fixed_time(),
        )
    }

    #[test]
    fn document_has_expected_top_level_keys() {
        let raw = serde_json::to_value(sample_document()).expect("serialize document");
        let obj = raw.as_object().expect("document object");
        assert_eq!(obj.len(), 3);
        assert_eq!(raw["source"], json!(SOURCE_LABEL));
        assert_eq!(raw["generatedAt"], json!("2026-01-01T00:00:00Z"));
        assert_eq!(raw["projects"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn counts_split_ok_and_error() {
        let doc = sample_document();
        assert_eq!(doc.ok_count(), 1);
        assert_eq!(doc.error_count(), 1);
    }

    #[test]
    fn pretty_render_is_indented_with_trailing_newline() {
        let content = render_document(&sample_document(), OutputStyle::Pretty).unwrap();
        assert!(content.starts_with("{\n  \"generatedAt\""));
        assert!(content.ends_with("}\n"));
        assert!(!content.ends_with("\n\n"));
    }

    #[test]
    fn compact_render_is_single_line() {
        let content = render_document(&sample_document(), OutputStyle::Compact).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn write_document_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("projects.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content that is much longer than nothing at all").unwrap();

        let doc = sample_document();
        write_document(&path, &doc, OutputStyle::Pretty).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: OutputDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, doc);
        assert!(!written.contains("stale"));
    }

    #[test]
    fn write_document_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("projects.json");
        write_document(&path, &sample_document(), OutputStyle::Compact).unwrap();
        assert!(path.is_file());
    }
}
