//! SFB Program Model
//!
//! Block workspaces as produced by the visual editor, and their compilation
//! into the firmware's direction sequence.
//!
//! # Core Concepts
//!
//! - [`Workspace`]: Array-backed forest of block chains
//! - [`BlockSource`]: The two editor capabilities the walker relies on
//! - [`walk`]: Linearizes a workspace into block-kind tokens
//! - [`Directive`]: Hardware-facing maneuver token (`FORWARD`, `FLIP`, ...)
//! - [`compile`]: Maps block kinds to directives and renders the array literal
//!
//! # Example
//!
//! ```rust,ignore
//! use sfb_program::{compile_workspace, Workspace};
//!
//! let workspace = Workspace::chain(["take_off", "forward_1s", "land"]);
//! let program = compile_workspace(Some(&workspace))?;
//!
//! assert_eq!(program.literal, "Direction_t direction_sequence[] = {FORWARD};");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod block;
mod blockly;
mod compiler;
mod directive;
mod error;
mod walker;
mod workspace;

// Re-exports
pub use block::{Block, BlockIndex, BlockKind, NumericField};
pub use compiler::{
    compile, compile_workspace, render_literal, CompiledProgram, DirectiveTable, SEQUENCE_IDENT,
    SEQUENCE_TYPE_NAME,
};
pub use directive::Directive;
pub use error::ProgramError;
pub use walker::walk;
pub use workspace::{BlockSource, Workspace};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn workspace_to_literal() {
        let workspace = Workspace::chain(["take_off", "forward_1s", "forward_1s", "rotate", "land"]);
        let program = compile_workspace(Some(&workspace)).unwrap();

        assert_eq!(
            program.directives,
            vec![Directive::Forward, Directive::Forward, Directive::Flip]
        );
        assert_eq!(
            program.literal,
            "Direction_t direction_sequence[] = {FORWARD, FORWARD, FLIP};"
        );
        assert_eq!(program.kinds.len(), 5);
    }

    #[test]
    fn absent_workspace_is_empty_program() {
        let program = compile_workspace(None::<&Workspace>).unwrap();
        assert!(program.is_empty());
        assert_eq!(program.literal, "Direction_t direction_sequence[] = {};");
    }
}
