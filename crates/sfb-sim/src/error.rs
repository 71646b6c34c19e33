//! Simulator errors

use thiserror::Error;

/// Error type for simulator operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Another run is still active on this simulator
    #[error("a simulation is already running")]
    Busy,

    /// Nothing to simulate
    #[error("place blocks before simulating")]
    EmptyProgram,

    /// Grid dimensions or start position are unusable
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The run task panicked or was aborted
    #[error("simulation task failed: {0}")]
    TaskFailed(String),
}

impl SimError {
    /// Whether the caller may simply retry once the current run ends
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}
