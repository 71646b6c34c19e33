//! Directive compiler
//!
//! Turns walked block kinds into the firmware's direction sequence and its
//! single-line array literal:
//!
//! ```text
//! Direction_t direction_sequence[] = {FORWARD, FORWARD, FLIP};
//! ```
//!
//! The type name and identifier are shared with the template patcher, whose
//! pattern must find exactly this declaration in the firmware header.

use crate::block::BlockKind;
use crate::directive::Directive;
use crate::error::ProgramError;
use crate::walker::walk;
use crate::workspace::BlockSource;
use serde::{Deserialize, Serialize};

/// Declared element type of the sequence array
pub const SEQUENCE_TYPE_NAME: &str = "Direction_t";

/// Identifier of the sequence array
pub const SEQUENCE_IDENT: &str = "direction_sequence";

/// Fixed mapping from block kind to directive
///
/// Total over [`BlockKind`]; `None` entries (take-off, landing) emit nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveTable;

impl DirectiveTable {
    /// Directive for a known kind
    #[inline]
    #[must_use]
    pub const fn directive_for(kind: BlockKind) -> Option<Directive> {
        match kind {
            BlockKind::TakeOff | BlockKind::Land => None,
            BlockKind::Forward => Some(Directive::Forward),
            BlockKind::Right => Some(Directive::Right),
            BlockKind::Left => Some(Directive::Left),
            BlockKind::Back => Some(Directive::Back),
            BlockKind::Rotate => Some(Directive::Flip),
        }
    }

    /// Directive for a raw editor token; unknown tokens map to `None`
    #[inline]
    #[must_use]
    pub fn lookup(token: &str) -> Option<Directive> {
        BlockKind::from_token(token).and_then(Self::directive_for)
    }
}

/// Result of compiling one workspace snapshot
///
/// Immutable once produced; the persist and simulate flows share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    /// Walked block kinds, including those that emit no directive
    pub kinds: Vec<String>,
    /// Emitted directives in traversal order
    pub directives: Vec<Directive>,
    /// Array declaration line for the firmware header
    pub literal: String,
}

impl CompiledProgram {
    /// Whether no blocks were walked at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Directive tokens as strings
    #[must_use]
    pub fn directives_as_tokens(&self) -> Vec<&'static str> {
        self.directives.iter().map(|d| d.token()).collect()
    }
}

/// Render the sequence array declaration
#[must_use]
pub fn render_literal(directives: &[Directive]) -> String {
    let body = directives
        .iter()
        .map(|d| d.token())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{SEQUENCE_TYPE_NAME} {SEQUENCE_IDENT}[] = {{{body}}};")
}

/// Compile already-walked block kinds
///
/// Unknown kinds are skipped; identical input always yields a byte-identical
/// literal.
#[must_use]
pub fn compile<S: AsRef<str>>(kinds: &[S]) -> CompiledProgram {
    let mut directives = Vec::with_capacity(kinds.len());
    let mut skipped = 0usize;

    for kind in kinds {
        let kind = kind.as_ref();
        match BlockKind::from_token(kind) {
            Some(known) => directives.extend(DirectiveTable::directive_for(known)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped unknown block kinds");
    }

    CompiledProgram {
        kinds: kinds.iter().map(|k| k.as_ref().to_string()).collect(),
        literal: render_literal(&directives),
        directives,
    }
}

/// Walk and compile a workspace
///
/// # Errors
/// Propagates walker errors (cycles, dangling links)
pub fn compile_workspace<S>(source: Option<&S>) -> Result<CompiledProgram, ProgramError>
where
    S: BlockSource + ?Sized,
{
    let kinds = walk(source)?;
    Ok(compile(&kinds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_kind() {
        let mapped: Vec<_> = BlockKind::ALL
            .into_iter()
            .map(|k| (k, DirectiveTable::directive_for(k)))
            .collect();

        assert!(mapped.contains(&(BlockKind::TakeOff, None)));
        assert!(mapped.contains(&(BlockKind::Land, None)));
        assert!(mapped.contains(&(BlockKind::Rotate, Some(Directive::Flip))));
        assert_eq!(DirectiveTable::lookup("right_1s"), Some(Directive::Right));
        assert_eq!(DirectiveTable::lookup("warp_drive"), None);
    }

    #[test]
    fn literal_format() {
        assert_eq!(render_literal(&[]), "Direction_t direction_sequence[] = {};");
        assert_eq!(
            render_literal(&[Directive::Right, Directive::Back]),
            "Direction_t direction_sequence[] = {RIGHT, BACK};"
        );
    }

    #[test]
    fn unknown_kinds_yield_no_directives() {
        let program = compile(&["hover_3s", "spin", "beep"]);
        assert_eq!(program.kinds.len(), 3);
        assert!(program.directives.is_empty());
        assert!(!program.is_empty());
    }

    #[test]
    fn takeoff_and_land_emit_nothing() {
        let program = compile(&["take_off", "left_1s", "land"]);
        assert_eq!(program.directives_as_tokens(), vec!["LEFT"]);
    }
}
