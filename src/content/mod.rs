//! Backing content files for the server's capabilities.
//!
//! The server exposes three static artifacts: a best-practices
//! instructions markdown file, the design-library documentation markdown,
//! and a JSON snapshot of a Figma design document. This module reads them
//! from their configured locations; absence or malformed JSON is the only
//! realistic failure source at runtime.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ContentConfig;
use crate::error::ContentError;

/// Reads the backing content files from their configured paths.
///
/// Paths are resolved relative to the server's working directory. Files
/// are read on every request, so edits are picked up without a restart.
#[derive(Debug, Clone)]
pub struct ContentStore {
    instructions_path: PathBuf,
    documentation_path: PathBuf,
    design_snapshot_path: PathBuf,
}

impl ContentStore {
    /// Creates a store over the given file paths.
    #[must_use]
    pub fn new(
        instructions_path: impl Into<PathBuf>,
        documentation_path: impl Into<PathBuf>,
        design_snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            instructions_path: instructions_path.into(),
            documentation_path: documentation_path.into(),
            design_snapshot_path: design_snapshot_path.into(),
        }
    }

    /// Creates a store from the content section of the configuration.
    #[must_use]
    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(
            config.instructions_path.clone(),
            config.documentation_path.clone(),
            config.design_snapshot_path.clone(),
        )
    }

    /// Reads the best-practices instructions markdown verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn instructions(&self) -> Result<String, ContentError> {
        read_text(&self.instructions_path).await
    }

    /// Reads the design-library documentation markdown verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn documentation(&self) -> Result<String, ContentError> {
        read_text(&self.documentation_path).await
    }

    /// Reads and parses the design JSON snapshot.
    ///
    /// The document is kept opaque; no design-format schema is imposed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub async fn design_snapshot(&self) -> Result<Value, ContentError> {
        let raw = read_text(&self.design_snapshot_path).await?;
        serde_json::from_str(&raw).map_err(|e| ContentError::Parse {
            path: self.design_snapshot_path.clone(),
            source: e,
        })
    }
}

async fn read_text(path: &Path) -> Result<String, ContentError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ContentError::Read {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> ContentStore {
        ContentStore::new(
            dir.join("instructions.md"),
            dir.join("glide-documentation.md"),
            dir.join("design.json"),
        )
    }

    #[tokio::test]
    async fn reads_markdown_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let body = "# Instructions\n\nUse semantic HTML.\n";
        std::fs::write(dir.path().join("instructions.md"), body).unwrap();

        let store = store_in(dir.path());
        assert_eq!(store.instructions().await.unwrap(), body);
    }

    #[tokio::test]
    async fn parses_design_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("design.json"),
            r#"{"document": {"children": [{"type": "CANVAS"}]}}"#,
        )
        .unwrap();

        let store = store_in(dir.path());
        let snapshot = store.design_snapshot().await.unwrap();
        assert_eq!(snapshot["document"]["children"][0]["type"], "CANVAS");
    }

    #[tokio::test]
    async fn missing_file_reports_path_and_cause() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store.documentation().await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("glide-documentation.md"));
        assert!(msg.contains("failed to read"));
    }

    #[tokio::test]
    async fn malformed_snapshot_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("design.json"), "{not json").unwrap();

        let store = store_in(dir.path());
        let err = store.design_snapshot().await.unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(err.to_string().contains("design.json"));
    }
}
