//! Grid Simulator
//!
//! Previews a compiled block program as a drone moving on a square grid.
//! Stepping is a pure function over [`SimulationState`]; [`Simulator`]
//! drives it in real time on the tokio runtime, publishing each [`Frame`]
//! and honoring cancellation between steps.
//!
//! At most one run is active per [`Simulator`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod grid;
mod render;
mod runner;
mod state;
mod trace;
mod transition;

pub use error::SimError;
pub use grid::{GridConfig, SimulatorConfig};
pub use render::render_grid;
pub use runner::{RunHandle, RunOutcome, Simulator};
pub use state::{Altitude, SimulationState};
pub use trace::{Frame, Trace};
pub use transition::{apply, Action};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
