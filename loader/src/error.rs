//! Error types for framework loading.
//!
//! Covers I/O failures and malformed definition documents. A framework that
//! loads successfully always has the shape the resolution core expects.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a framework or its configuration.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File or directory I/O failure.
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML document could not be parsed into the expected shape.
    #[error("malformed YAML in '{}': {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON document could not be parsed into the expected shape.
    #[error("malformed JSON in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The framework root has no `framework.yaml`.
    #[error("missing framework file: {}", .0.display())]
    MissingFrameworkFile(PathBuf),

    /// A bundle file has an extension other than yaml, yml or json.
    #[error("unsupported bundle format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
