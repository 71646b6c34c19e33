//! Single-step state transition
//!
//! Pure and total: every block kind, known or not, yields a state on the
//! grid. Horizontal moves saturate at the edges instead of wrapping.

use crate::grid::GridConfig;
use crate::state::{Altitude, SimulationState};
use sfb_program::BlockKind;

/// What one block does to the drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TakeOff,
    Land,
    /// Horizontal move by one cell; `(dx, dy)` with `y` growing downward
    Move { dx: i8, dy: i8 },
    Flip,
    /// Unrecognized kind; leaves the state unchanged
    Unknown,
}

impl Action {
    /// Action for a known block kind
    #[must_use]
    pub const fn for_kind(kind: BlockKind) -> Self {
        match kind {
            BlockKind::TakeOff => Self::TakeOff,
            BlockKind::Land => Self::Land,
            BlockKind::Forward => Self::Move { dx: 0, dy: -1 },
            BlockKind::Back => Self::Move { dx: 0, dy: 1 },
            BlockKind::Left => Self::Move { dx: -1, dy: 0 },
            BlockKind::Right => Self::Move { dx: 1, dy: 0 },
            BlockKind::Rotate => Self::Flip,
        }
    }

    /// Action for a block-kind token; unknown tokens map to [`Action::Unknown`]
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        BlockKind::from_token(token).map_or(Self::Unknown, Self::for_kind)
    }
}

fn step_axis(value: u32, delta: i8, max: u32) -> u32 {
    let moved = if delta < 0 {
        value.saturating_sub(u32::from(delta.unsigned_abs()))
    } else {
        value.saturating_add(u32::from(delta.unsigned_abs()))
    };
    moved.min(max)
}

/// Apply `action` to `state`
///
/// Moves and flips apply at any altitude. `is_transitioning` is raised by a
/// flip and otherwise left as found; clearing it is the caller's business
/// once the flip has been shown.
#[must_use]
pub fn apply(state: &SimulationState, action: Action, grid: &GridConfig) -> SimulationState {
    let mut next = *state;
    match action {
        Action::TakeOff => next.altitude = Altitude::Airborne,
        Action::Land => next.altitude = Altitude::Grounded,
        Action::Move { dx, dy } => {
            let max = grid.grid_max();
            next.x = step_axis(state.x, dx, max);
            next.y = step_axis(state.y, dy, max);
        }
        Action::Flip => next.is_transitioning = true,
        Action::Unknown => {}
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn airborne(x: u32, y: u32) -> SimulationState {
        SimulationState {
            altitude: Altitude::Airborne,
            ..SimulationState::grounded_at(x, y)
        }
    }

    #[test]
    fn grounded_drone_still_moves_and_flips() {
        let grid = GridConfig::default();
        let start = grid.start_state();

        let moved = apply(&start, Action::from_token("forward_1s"), &grid);
        assert_eq!((moved.x, moved.y), (5, 4));
        assert_eq!(moved.altitude, Altitude::Grounded);

        let flipped = apply(&start, Action::from_token("rotate"), &grid);
        assert!(flipped.is_transitioning);
        assert_eq!((flipped.x, flipped.y), (5, 5));

        assert_eq!(apply(&start, Action::from_token("land"), &grid), start);
    }

    #[test]
    fn moves_follow_screen_axes() {
        let grid = GridConfig::default();
        let s = airborne(5, 5);
        assert_eq!(apply(&s, Action::from_token("forward_1s"), &grid).y, 4);
        assert_eq!(apply(&s, Action::from_token("back_1s"), &grid).y, 6);
        assert_eq!(apply(&s, Action::from_token("left_1s"), &grid).x, 4);
        assert_eq!(apply(&s, Action::from_token("right_1s"), &grid).x, 6);
    }

    #[test]
    fn edges_saturate() {
        let grid = GridConfig::default();
        assert_eq!(apply(&airborne(0, 0), Action::from_token("forward_1s"), &grid), airborne(0, 0));
        assert_eq!(apply(&airborne(0, 0), Action::from_token("left_1s"), &grid), airborne(0, 0));
        assert_eq!(apply(&airborne(10, 10), Action::from_token("back_1s"), &grid), airborne(10, 10));
        assert_eq!(apply(&airborne(10, 10), Action::from_token("right_1s"), &grid), airborne(10, 10));
    }

    #[test]
    fn flip_raises_transition_flag_only() {
        let grid = GridConfig::default();
        let flipped = apply(&airborne(3, 7), Action::Flip, &grid);
        assert!(flipped.is_transitioning);
        assert_eq!((flipped.x, flipped.y, flipped.heading), (3, 7, 0));
    }

    #[test]
    fn unknown_kind_is_a_no_op() {
        let grid = GridConfig::default();
        let s = airborne(2, 2);
        assert_eq!(Action::from_token("hover_5s"), Action::Unknown);
        assert_eq!(apply(&s, Action::Unknown, &grid), s);
    }

    fn any_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("take_off".to_string()),
            Just("land".to_string()),
            Just("forward_1s".to_string()),
            Just("back_1s".to_string()),
            Just("left_1s".to_string()),
            Just("right_1s".to_string()),
            Just("rotate".to_string()),
            "[a-z_]{1,8}",
        ]
    }

    proptest! {
        #[test]
        fn position_never_leaves_grid(
            size in 1u32..16,
            tokens in prop::collection::vec(any_token(), 0..64),
        ) {
            let grid = GridConfig::square(size);
            let mut state = grid.start_state();
            for token in &tokens {
                state = apply(&state, Action::from_token(token), &grid);
                prop_assert!(state.x <= grid.grid_max());
                prop_assert!(state.y <= grid.grid_max());
                prop_assert_eq!(state.heading, 0);
            }
        }
    }
}
