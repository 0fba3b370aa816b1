//! Error types for release pipeline operations.

use std::{path::PathBuf, process::ExitStatus, result};

/// Errors that can occur while versioning, packaging, or releasing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid version string '{0}': expected dot-separated numbers")]
    Format(String),

    #[error("version numbers differ across target manifests: {0}")]
    Consistency(String),

    #[error("no version available: version.json is missing and no version was given")]
    NoVersion,

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("command `{command}` failed with {status}")]
    Command { command: String, status: ExitStatus },

    #[error(transparent)]
    Convert(#[from] plume_css_manifest::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }
}

pub type Result<T> = result::Result<T, Error>;
