// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Pure reducer: `(state, action) -> (state, effects)`.
//!
//! The reducer never performs side effects itself. It describes them as
//! [`Effect`] values which the [`Controller`](crate::controller::Controller)
//! carries out (arming the timer, notifying subscribers).

use crate::scheduler::{self, StartOutcome, TickOutcome};
use crate::state::{ControlState, InputSource};

/// Everything that can change the control state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// New desired temperature from the slider or a parsed text entry.
    SetDesired { value: f64, source: InputSource },
    /// New step size from the step slider.
    SetStep(f64),
    /// "Adjust Temperature": start a run if idle.
    Start,
    /// One scheduled tick fired.
    Tick,
    /// Stop the current run early.
    Cancel,
    /// "Default Settings".
    Reset,
}

/// A side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The chart and readouts must be redrawn.
    Redraw,
    /// Arm the next tick one interval from now.
    ScheduleTick,
    /// Disarm any pending tick.
    CancelTick,
    /// The run converged after `iterations` ticks.
    Stabilized { iterations: u32 },
    /// The run was stopped before converging.
    Cancelled { iterations: u32 },
    /// Informational message for the user.
    Notice(String),
}

/// Output of [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: ControlState,
    pub effects: Vec<Effect>,
}

impl Reduction {
    fn unchanged(state: ControlState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Compute the next state and the effects it implies.
pub fn reduce(state: ControlState, action: Action) -> Reduction {
    match action {
        Action::SetDesired { value, source } => {
            let next = state.with_desired(value, source);
            let mut effects = vec![Effect::Redraw];
            if source == InputSource::Text {
                effects.push(Effect::Notice(format!(
                    "Desired temperature set to {:.1}°C",
                    next.desired_c
                )));
            }
            Reduction {
                state: next,
                effects,
            }
        }

        // The step slider has no visual on the chart.
        Action::SetStep(value) => Reduction::unchanged(state.with_step(value)),

        Action::Start => match scheduler::start(state) {
            StartOutcome::Started(next) => Reduction {
                state: next,
                effects: vec![Effect::ScheduleTick],
            },
            StartOutcome::AlreadyRunning => Reduction::unchanged(state),
        },

        Action::Tick => match scheduler::tick(state) {
            TickOutcome::Continue(next) => Reduction {
                state: next,
                effects: vec![Effect::Redraw, Effect::ScheduleTick],
            },
            TickOutcome::Stabilized(next) => Reduction {
                state: next,
                effects: vec![
                    Effect::Redraw,
                    Effect::Stabilized {
                        iterations: next.iterations,
                    },
                ],
            },
            TickOutcome::Idle => Reduction::unchanged(state),
        },

        Action::Cancel => match scheduler::cancel(state) {
            Some(next) => Reduction {
                state: next,
                effects: vec![
                    Effect::CancelTick,
                    Effect::Cancelled {
                        iterations: next.iterations,
                    },
                ],
            },
            None => Reduction::unchanged(state),
        },

        Action::Reset => Reduction {
            state: state.reset(),
            effects: vec![
                Effect::CancelTick,
                Effect::Redraw,
                Effect::Notice("Settings reset to default values.".to_string()),
            ],
        },
    }
}
