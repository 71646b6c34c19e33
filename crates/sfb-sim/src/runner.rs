//! Real-time run driver
//!
//! A run applies one block per step with the configured pauses between
//! them. Frames are published on a `watch` channel; subscribers always see
//! the latest state. Cancellation is checked only between steps, so a
//! cancelled run stops on the last state it fully applied.

use crate::error::SimError;
use crate::grid::SimulatorConfig;
use crate::state::SimulationState;
use crate::trace::{Frame, Trace};
use crate::transition::{apply, Action};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub trace: Trace,
    pub final_state: SimulationState,
    pub cancelled: bool,
}

/// Drives at most one run at a time
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    busy: Arc<AtomicBool>,
}

impl Simulator {
    /// Create a simulator
    ///
    /// # Errors
    /// `SimError::InvalidGrid` if the grid configuration is unusable
    pub fn new(config: SimulatorConfig) -> Result<Self, SimError> {
        config.grid.validate()?;
        Ok(Self {
            config,
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Whether a run is in progress
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start a run over `kinds` on the current tokio runtime
    ///
    /// # Errors
    /// - `SimError::EmptyProgram` if `kinds` is empty
    /// - `SimError::Busy` if a run is already active
    pub fn start(&self, kinds: Vec<String>) -> Result<RunHandle, SimError> {
        if kinds.is_empty() {
            return Err(SimError::EmptyProgram);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("simulation rejected: another run is active");
            return Err(SimError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (frame_tx, frame_rx) = watch::channel(Frame::initial(self.config.grid.start_state()));

        tracing::info!(steps = kinds.len(), "simulation started");
        let task = tokio::spawn(run_loop(self.config, kinds, cancel_rx, frame_tx, guard));

        Ok(RunHandle {
            cancel: cancel_tx,
            frames: frame_rx,
            task,
        })
    }

    /// Start a run and wait for it to end
    ///
    /// # Errors
    /// See [`Simulator::start`] and [`RunHandle::finish`]
    pub async fn run(&self, kinds: Vec<String>) -> Result<RunOutcome, SimError> {
        self.start(kinds)?.finish().await
    }
}

/// Handle to an active run
///
/// Dropping the handle detaches the run; it continues to completion.
#[derive(Debug)]
pub struct RunHandle {
    cancel: watch::Sender<bool>,
    frames: watch::Receiver<Frame>,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Ask the run to stop before its next step
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Receiver of the latest published frame
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    /// Wait for the run to end
    ///
    /// # Errors
    /// `SimError::TaskFailed` if the run task panicked or was aborted
    pub async fn finish(self) -> Result<RunOutcome, SimError> {
        self.task
            .await
            .map_err(|e| SimError::TaskFailed(e.to_string()))
    }
}

/// Clears the busy flag when the run task ends, however it ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Publisher {
    trace: Trace,
    frames: watch::Sender<Frame>,
}

impl Publisher {
    fn emit(&mut self, frame: Frame) {
        tracing::debug!(step = frame.step, state = %frame.state, "frame");
        self.trace.push(frame.clone());
        self.frames.send_replace(frame);
    }

    fn finish(self, final_state: SimulationState, cancelled: bool) -> RunOutcome {
        if cancelled {
            tracing::info!(steps = self.trace.steps_applied(), "simulation cancelled");
        } else {
            tracing::info!(steps = self.trace.steps_applied(), "simulation finished");
        }
        RunOutcome {
            trace: self.trace,
            final_state,
            cancelled,
        }
    }
}

async fn run_loop(
    config: SimulatorConfig,
    kinds: Vec<String>,
    mut cancel: watch::Receiver<bool>,
    frames: watch::Sender<Frame>,
    _busy: BusyGuard,
) -> RunOutcome {
    let mut state = config.grid.start_state();
    let mut out = Publisher {
        trace: Trace::new(),
        frames,
    };
    out.emit(Frame::initial(state));

    if pause(config.start_delay, &mut cancel).await {
        return out.finish(state, true);
    }

    for (index, kind) in kinds.into_iter().enumerate() {
        let step = index + 1;
        let action = Action::from_token(&kind);
        if action == Action::Unknown {
            tracing::debug!(kind = %kind, "unknown block kind, state unchanged");
        }
        state = apply(&state, action, &config.grid);
        out.emit(Frame {
            step,
            action: Some(kind.clone()),
            state,
        });

        let mut remaining = config.step_delay;
        if state.is_transitioning {
            let shown = config.flip_duration.min(remaining);
            if !shown.is_zero() {
                tokio::time::sleep(shown).await;
            }
            remaining = remaining.saturating_sub(shown);
            state.is_transitioning = false;
            out.emit(Frame {
                step,
                action: Some(kind),
                state,
            });
        }

        if pause(remaining, &mut cancel).await {
            return out.finish(state, true);
        }
    }

    out.finish(state, false)
}

/// Sleep for `duration`; returns true if cancellation was requested
async fn pause(duration: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
    if *cancel.borrow_and_update() {
        return true;
    }
    if duration.is_zero() {
        return false;
    }

    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return *cancel.borrow(),
            changed = cancel.changed() => match changed {
                Ok(()) => {
                    if *cancel.borrow_and_update() {
                        return true;
                    }
                }
                // handle dropped: nobody can cancel any more
                Err(_) => {
                    sleep.as_mut().await;
                    return false;
                }
            },
        }
    }
}
