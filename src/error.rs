//! Error types for figma-to-code-mcp.
//!
//! Tool handlers surface failures to the client as tool-level error
//! results, so `ContentError` and `HandlerError` display text must carry
//! the underlying cause rather than hiding it behind a `#[source]` chain.

use std::path::PathBuf;

use thiserror::Error;

use crate::mcp::registry::CapabilityKind;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while loading one of the backing content files.
#[derive(Error, Debug)]
pub enum ContentError {
    /// The backing file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while populating the capability registry at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A capability with the same (kind, key) is already registered.
    #[error("duplicate {kind} registration: {key}")]
    DuplicateKey {
        /// The capability kind.
        kind: CapabilityKind,
        /// The conflicting key.
        key: String,
    },

    /// A capability was registered with an empty key.
    #[error("{kind} registered with an empty key")]
    EmptyKey {
        /// The capability kind.
        kind: CapabilityKind,
    },
}

/// A lookup for a capability key that is not registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} not found: {key}")]
pub struct NotFoundError {
    /// The capability kind that was searched.
    pub kind: CapabilityKind,
    /// The key that was requested.
    pub key: String,
}

/// A failure raised by a capability handler.
///
/// Carries a human-readable message only; the dispatcher converts tool
/// handler failures into tool-level error results with this text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable failure description.
    pub message: String,
}

impl HandlerError {
    /// Creates a new handler error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ContentError> for HandlerError {
    fn from(error: ContentError) -> Self {
        Self::new(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn content_read_error_carries_io_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let error = ContentError::Read {
            path: PathBuf::from("./design.json"),
            source: io,
        };
        let msg = error.to_string();
        assert!(msg.contains("design.json"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn not_found_error_message_format() {
        let error = NotFoundError {
            kind: CapabilityKind::Prompt,
            key: "missing-prompt".to_string(),
        };
        assert_eq!(error.to_string(), "Prompt not found: missing-prompt");
    }

    #[test]
    fn duplicate_key_message() {
        let error = RegistryError::DuplicateKey {
            kind: CapabilityKind::Tool,
            key: "fetch-figma-design".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("duplicate Tool registration"));
        assert!(msg.contains("fetch-figma-design"));
    }

    #[test]
    fn handler_error_from_content_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let content = ContentError::Read {
            path: PathBuf::from("./docs/instructions.md"),
            source: io,
        };
        let handler: HandlerError = content.into();
        assert!(handler.message.contains("instructions.md"));
        assert!(handler.message.contains("missing"));
    }
}
