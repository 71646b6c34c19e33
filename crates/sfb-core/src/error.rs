//! Error types for the studio
//!
//! Every crate-level error funnels into [`StudioError`], and every
//! [`StudioError`] falls into exactly one [`ErrorKind`]. Callers outside
//! the process see only [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use sfb_program::ProgramError;
use sfb_sim::SimError;
use sfb_store::{PatchError, StoreError};
use std::fmt;

/// Main studio error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Workspace could not be loaded or walked
    #[error("program error: {0}")]
    Program(#[from] ProgramError),

    /// Resolution, file I/O or upload failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Template could not be patched
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    /// Simulation could not run
    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

/// Caller-facing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InvalidPath,
    NotFound,
    PatchMismatch,
    IoError,
    UpstreamCommandFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "InvalidInput",
            Self::InvalidPath => "InvalidPath",
            Self::NotFound => "NotFound",
            Self::PatchMismatch => "PatchMismatch",
            Self::IoError => "IoError",
            Self::UpstreamCommandFailure => "UpstreamCommandFailure",
        };
        f.write_str(name)
    }
}

impl StudioError {
    /// Create configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Program(_) | Self::Config(_) => ErrorKind::InvalidInput,
            Self::Store(e) => match e {
                StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
                StoreError::InvalidPath { .. } => ErrorKind::InvalidPath,
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::Io { .. } | StoreError::AuditTampered { .. } => ErrorKind::IoError,
                StoreError::UploadSpawn { .. } | StoreError::UploadFailed { .. } => {
                    ErrorKind::UpstreamCommandFailure
                }
            },
            Self::Patch(PatchError::Mismatch { .. }) => ErrorKind::PatchMismatch,
            Self::Patch(PatchError::InvalidLiteral(_)) => ErrorKind::InvalidInput,
            Self::Simulation(SimError::TaskFailed(_)) => ErrorKind::IoError,
            Self::Simulation(_) => ErrorKind::InvalidInput,
        }
    }

    /// Errors that must abort a flow without any fallback
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidPath | ErrorKind::PatchMismatch)
    }

    /// Read failures after which the persist flow uses the default template
    #[inline]
    #[must_use]
    pub fn allows_default_template(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::IoError)
    }

    /// Structured form for callers
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Structured error returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&StudioError> for ErrorResponse {
    fn from(value: &StudioError) -> Self {
        value.to_response()
    }
}
