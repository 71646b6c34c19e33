//! Recorded frames of a run

use crate::grid::GridConfig;
use crate::render::render_grid;
use crate::state::SimulationState;
use serde::Serialize;

/// One published state
///
/// Step 0 is the start state. A flip publishes two frames with the same
/// step: one raised, one cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub step: usize,
    /// Block kind applied at this step
    pub action: Option<String>,
    pub state: SimulationState,
}

impl Frame {
    /// Frame for the start state
    #[must_use]
    pub fn initial(state: SimulationState) -> Self {
        Self {
            step: 0,
            action: None,
            state,
        }
    }
}

/// Ordered frames of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    /// Create an empty trace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// All frames, oldest first
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recent frame
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Number of flips shown
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.frames
            .windows(2)
            .filter(|pair| !pair[0].state.is_transitioning && pair[1].state.is_transitioning)
            .count()
            + usize::from(self.frames.first().is_some_and(|f| f.state.is_transitioning))
    }

    /// Rendered grid for every frame, in order
    pub fn replay<'a>(&'a self, grid: &'a GridConfig) -> impl Iterator<Item = String> + 'a {
        self.frames.iter().map(move |f| render_grid(&f.state, grid))
    }

    /// Highest step reached
    #[must_use]
    pub fn steps_applied(&self) -> usize {
        self.frames.last().map_or(0, |f| f.step)
    }
}
