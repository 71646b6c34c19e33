//! Graph walker
//!
//! Linearizes a workspace: chain heads in workspace order, each followed
//! through its `next` links, kinds concatenated.

use crate::error::ProgramError;
use crate::workspace::BlockSource;
use std::collections::HashSet;

/// Ordered block-kind tokens of every chain in `source`
///
/// An absent workspace yields an empty list; callers treat that as
/// "no program" rather than an error.
///
/// # Errors
/// - `ProgramError::CycleDetected` if a chain links back into itself
/// - `ProgramError::DanglingReference` if a link names a missing block
pub fn walk<S>(source: Option<&S>) -> Result<Vec<String>, ProgramError>
where
    S: BlockSource + ?Sized,
{
    let Some(source) = source else {
        return Ok(Vec::new());
    };

    let mut kinds = Vec::with_capacity(source.block_count());
    let mut seen = HashSet::new();

    for head in source.top_blocks() {
        seen.clear();
        let mut current = Some(head);

        while let Some(index) = current {
            if !seen.insert(index) {
                return Err(ProgramError::CycleDetected(index));
            }
            let kind = source.kind_of(index).ok_or(ProgramError::DanglingReference {
                index,
                len: source.block_count(),
            })?;
            kinds.push(kind.to_string());
            current = source.next_block(index);
        }
    }

    Ok(kinds)
}
