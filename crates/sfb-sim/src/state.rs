//! Observable drone state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertical state of the drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Altitude {
    Grounded,
    Airborne,
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grounded => write!(f, "grounded"),
            Self::Airborne => write!(f, "airborne"),
        }
    }
}

/// Position and status of the simulated drone
///
/// `y` grows downward: forward decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationState {
    pub x: u32,
    pub y: u32,
    pub altitude: Altitude,
    /// Degrees; carried for display, no block changes it
    pub heading: u16,
    /// Set while a flip is being shown
    pub is_transitioning: bool,
}

impl SimulationState {
    /// Grounded at `(x, y)`
    #[must_use]
    pub fn grounded_at(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            altitude: Altitude::Grounded,
            heading: 0,
            is_transitioning: false,
        }
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}", self.x, self.y, self.altitude)?;
        if self.is_transitioning {
            write!(f, " flipping")?;
        }
        Ok(())
    }
}
