//! Grid and timing configuration

use crate::error::SimError;
use crate::state::SimulationState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Square grid with a start cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side; coordinates run `0..size`
    pub size: u32,
    pub start_x: u32,
    pub start_y: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 11,
            start_x: 5,
            start_y: 5,
        }
    }
}

impl GridConfig {
    /// Square grid of `size` cells per side, starting at the center
    #[must_use]
    pub fn square(size: u32) -> Self {
        Self {
            size,
            start_x: size / 2,
            start_y: size / 2,
        }
    }

    /// Set the start cell
    #[must_use]
    pub fn with_start(mut self, x: u32, y: u32) -> Self {
        self.start_x = x;
        self.start_y = y;
        self
    }

    /// Largest valid coordinate on either axis
    #[inline]
    #[must_use]
    pub fn grid_max(&self) -> u32 {
        self.size.saturating_sub(1)
    }

    /// Grounded at the start cell
    #[must_use]
    pub fn start_state(&self) -> SimulationState {
        SimulationState::grounded_at(self.start_x, self.start_y)
    }

    /// Check the grid is non-empty and the start cell lies on it
    ///
    /// # Errors
    /// `SimError::InvalidGrid` describing the first problem found
    pub fn validate(&self) -> Result<(), SimError> {
        if self.size == 0 {
            return Err(SimError::InvalidGrid("size must be at least 1".to_string()));
        }
        if self.start_x > self.grid_max() || self.start_y > self.grid_max() {
            return Err(SimError::InvalidGrid(format!(
                "start ({}, {}) is outside 0..={}",
                self.start_x,
                self.start_y,
                self.grid_max()
            )));
        }
        Ok(())
    }
}

/// Grid plus pacing for a real-time run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub grid: GridConfig,
    /// Pause before the first step
    pub start_delay: Duration,
    /// Pause after each step
    pub step_delay: Duration,
    /// How long a flip stays visible, capped by `step_delay`
    pub flip_duration: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            start_delay: Duration::from_millis(500),
            step_delay: Duration::from_millis(1000),
            flip_duration: Duration::from_millis(500),
        }
    }
}

impl SimulatorConfig {
    /// No pauses at all; useful for tests and batch output
    #[must_use]
    pub fn instant() -> Self {
        Self {
            start_delay: Duration::ZERO,
            step_delay: Duration::ZERO,
            flip_duration: Duration::ZERO,
            ..Self::default()
        }
    }

    /// With grid
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// With per-step delay
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// With delay before the first step
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// With flip display duration
    #[must_use]
    pub fn with_flip_duration(mut self, duration: Duration) -> Self {
        self.flip_duration = duration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_matches_editor_preview() {
        let grid = GridConfig::default();
        assert_eq!(grid.grid_max(), 10);
        assert_eq!(grid.start_state(), SimulationState::grounded_at(5, 5));
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn rejects_empty_grid_and_offgrid_start() {
        assert!(GridConfig::square(0).validate().is_err());
        assert!(GridConfig::square(3).with_start(3, 0).validate().is_err());
        assert!(GridConfig::square(1).validate().is_ok());
    }
}
