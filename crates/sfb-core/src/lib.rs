//! SFB Core - block program studio
//!
//! The backend behind the visual editor: turns a block workspace into the
//! firmware's direction sequence, patches it into the header on disk and
//! previews it on a grid.
//!
//! # Example
//!
//! ```rust,ignore
//! use sfb_core::{Studio, StudioConfig};
//! use sfb_program::Workspace;
//!
//! let studio = Studio::new(StudioConfig::new().with_env())?;
//! let workspace = Workspace::chain(["take_off", "forward_1s", "rotate", "land"]);
//!
//! let report = studio.persist(Some(&workspace)).await?;
//! println!("wrote {}", report.write.path.display());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod studio;

// Re-exports for convenience
pub use config::{SimulatorSettings, StudioConfig, UploadConfig, BASE_DIR_ENV, DEFAULT_TARGET_FILE};
pub use error::{ErrorKind, ErrorResponse, StudioError};
pub use studio::{PersistReport, Studio, UploadStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a studio
    pub use crate::{ErrorKind, PersistReport, Studio, StudioConfig, StudioError, UploadStatus};
    pub use sfb_program::{CompiledProgram, Directive, Workspace};
    pub use sfb_sim::{Frame, RunHandle, RunOutcome};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
