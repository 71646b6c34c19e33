//! Error types for the program model

use crate::block::BlockIndex;

/// Errors raised while loading, validating or walking a workspace
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// A `next` link closes a loop back into an already visited block
    #[error("cycle detected at block {0}")]
    CycleDetected(BlockIndex),

    /// A link or top-level entry points at a block that does not exist
    #[error("block {index} referenced but workspace holds {len} blocks")]
    DanglingReference { index: BlockIndex, len: usize },

    /// A numeric field lies outside its declared bounds
    #[error("field '{field}' on block {index} is {value}, expected {min}..={max}")]
    FieldOutOfRange {
        index: BlockIndex,
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Block kind token is empty
    #[error("block {0} has an empty kind")]
    EmptyKind(BlockIndex),

    /// Snapshot could not be decoded
    #[error("malformed workspace snapshot: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProgramError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}
