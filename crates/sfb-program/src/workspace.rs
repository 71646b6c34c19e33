//! Workspace snapshots
//!
//! The editor hands over a snapshot of its workspace; we keep it as a flat
//! block array plus the ordered list of top-level chain heads.

use crate::block::{Block, BlockIndex};
use crate::error::ProgramError;
use serde::{Deserialize, Serialize};

/// Editor capabilities the graph walker depends on
pub trait BlockSource {
    /// Chain heads in the workspace's own top-level order
    fn top_blocks(&self) -> Vec<BlockIndex>;

    /// Successor of `index`, if it has one
    fn next_block(&self, index: BlockIndex) -> Option<BlockIndex>;

    /// Kind token of `index`
    fn kind_of(&self, index: BlockIndex) -> Option<&str>;

    /// Upper bound on distinct blocks, used for cycle detection
    fn block_count(&self) -> usize;
}

/// Array-backed workspace snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub top_blocks: Vec<BlockIndex>,
}

impl Workspace {
    /// Empty workspace
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block, returning its index
    pub fn push(&mut self, block: Block) -> BlockIndex {
        self.blocks.push(block);
        BlockIndex(self.blocks.len() - 1)
    }

    /// Append a new top-level chain of the given kinds
    pub fn push_chain<I, S>(&mut self, kinds: I) -> Option<BlockIndex>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start = self.blocks.len();
        for kind in kinds {
            self.blocks.push(Block::new(kind));
        }
        let end = self.blocks.len();
        if start == end {
            return None;
        }
        for i in start..end - 1 {
            self.blocks[i].next = Some(BlockIndex(i + 1));
        }
        let head = BlockIndex(start);
        self.top_blocks.push(head);
        Some(head)
    }

    /// Workspace holding a single chain
    #[must_use]
    pub fn chain<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut workspace = Self::new();
        workspace.push_chain(kinds);
        workspace
    }

    /// Decode the native JSON snapshot and validate it
    ///
    /// # Errors
    /// - `ProgramError::Malformed` if the JSON does not decode
    /// - any error from [`Workspace::validate`]
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let workspace: Self = serde_json::from_str(json)?;
        workspace.validate()?;
        Ok(workspace)
    }

    /// Encode as the native JSON snapshot
    ///
    /// # Errors
    /// Returns `ProgramError::Malformed` if serialization fails
    pub fn to_json(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of blocks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the workspace holds no blocks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: BlockIndex) -> Option<&Block> {
        self.blocks.get(index.0)
    }

    /// Check references and field bounds
    ///
    /// Cycles are not checked here; the walker reports them when it meets one.
    ///
    /// # Errors
    /// - `ProgramError::DanglingReference` for links past the end of the array
    /// - `ProgramError::EmptyKind` for blocks without a kind token
    /// - `ProgramError::FieldOutOfRange` for numeric fields outside their bounds
    pub fn validate(&self) -> Result<(), ProgramError> {
        let len = self.blocks.len();
        let check = |index: BlockIndex| {
            if index.0 < len {
                Ok(())
            } else {
                Err(ProgramError::DanglingReference { index, len })
            }
        };

        for head in &self.top_blocks {
            check(*head)?;
        }

        for (i, block) in self.blocks.iter().enumerate() {
            let index = BlockIndex(i);
            if block.kind.trim().is_empty() {
                return Err(ProgramError::EmptyKind(index));
            }
            if let Some(next) = block.next {
                check(next)?;
            }
            for (name, field) in &block.fields {
                if !field.in_range() {
                    return Err(ProgramError::FieldOutOfRange {
                        index,
                        field: name.clone(),
                        value: field.value,
                        min: field.min,
                        max: field.max,
                    });
                }
            }
        }

        Ok(())
    }
}

impl BlockSource for Workspace {
    fn top_blocks(&self) -> Vec<BlockIndex> {
        self.top_blocks.clone()
    }

    fn next_block(&self, index: BlockIndex) -> Option<BlockIndex> {
        self.get(index).and_then(|block| block.next)
    }

    fn kind_of(&self, index: BlockIndex) -> Option<&str> {
        self.get(index).map(|block| block.kind.as_str())
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
