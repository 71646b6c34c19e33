//! Error types for the store
//!
//! Provides error handling for:
//! - Path resolution (sandbox escapes, missing input)
//! - File I/O (missing files, filesystem failures)
//! - Template patching
//! - Post-write upload commands

use std::path::PathBuf;

/// Errors from resolution, file I/O and upload
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Required request input is missing or empty
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Path resolves outside the base directory
    #[error("path '{requested}' resolves outside {base}")]
    InvalidPath { requested: String, base: PathBuf },

    /// Read target does not exist
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// Underlying filesystem failure
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Upload command could not be started
    #[error("failed to spawn '{program}': {source}")]
    UploadSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Upload command exited unsuccessfully
    #[error("'{program}' exited with {}: {stderr}", describe_exit(.exit_code))]
    UploadFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Audit chain no longer verifies
    #[error("audit record {sequence} failed integrity check")]
    AuditTampered { sequence: u64 },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid path error
    pub fn invalid_path(requested: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self::InvalidPath {
            requested: requested.into(),
            base: base.into(),
        }
    }

    /// Whether this failure came from the post-write upload step
    #[inline]
    #[must_use]
    pub fn is_upload_failure(&self) -> bool {
        matches!(self, Self::UploadSpawn { .. } | Self::UploadFailed { .. })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Errors while patching a template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Template holds no sequence declaration to replace
    #[error("no declaration matching {pattern} in template")]
    Mismatch { pattern: String },

    /// Replacement literal is not itself a sequence declaration
    #[error("replacement is not a sequence declaration: {0}")]
    InvalidLiteral(String),
}
