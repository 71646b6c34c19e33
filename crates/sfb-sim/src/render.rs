//! Text rendering of the grid

use crate::grid::GridConfig;
use crate::state::{Altitude, SimulationState};
use std::fmt::Write;

/// Drone glyph for `state`
fn glyph(state: &SimulationState) -> char {
    match (state.altitude, state.is_transitioning) {
        (_, true) => '*',
        (Altitude::Airborne, false) => '^',
        (Altitude::Grounded, false) => 'o',
    }
}

/// Render the grid as rows of cells, the drone marked in its cell
///
/// `o` grounded, `^` airborne, `*` mid-flip, `.` empty.
#[must_use]
pub fn render_grid(state: &SimulationState, grid: &GridConfig) -> String {
    let mut out = String::with_capacity((grid.size as usize * 2 + 1) * grid.size as usize);
    for y in 0..grid.size {
        for x in 0..grid.size {
            if x > 0 {
                out.push(' ');
            }
            if x == state.x && y == state.y {
                out.push(glyph(state));
            } else {
                out.push('.');
            }
        }
        out.push('\n');
    }
    let _ = write!(out, "{state}");
    out.push('\n');
    out
}
