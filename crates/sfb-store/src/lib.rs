//! SFB Store
//!
//! The trusted boundary between compiled programs and the firmware tree on
//! disk.
//!
//! # Core Operations
//!
//! - **Resolve**: Confine a caller-supplied relative path to the base directory
//! - **Read / Write**: UTF-8 text I/O on resolved paths, every write audited
//! - **Patch**: Replace the one direction sequence declaration in a template
//! - **Upload**: Optional external build/flash command after a write
//!
//! # Architecture
//!
//! ```text
//! relative path → Sandbox::resolve → FileStore::read ─┐
//!                                                    ├→ patch → FileStore::write → AuditLog
//!                 CompiledProgram::literal ───────────┘                 ↓
//!                                                                    Uploader
//! ```
//!
//! Resolution always runs before any read or write touches the disk.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod audit;
pub mod error;
pub mod patcher;
pub mod sandbox;
pub mod store;
pub mod upload;

// Re-exports for convenience
pub use audit::{AuditLog, AuditRecord};
pub use error::{PatchError, StoreError};
pub use patcher::{find_declaration, patch, DEFAULT_TEMPLATE};
pub use sandbox::Sandbox;
pub use store::{FileStore, ReadOutcome, WriteOutcome};
pub use upload::{CommandUploader, UploadOutput, Uploader};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
