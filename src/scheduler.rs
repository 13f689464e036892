// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Step scheduler: the fixed-step convergence rules.
//!
//! A run is a chain of ticks. Each tick moves the current temperature at
//! most one step toward the target and never past it. The chain ends when
//! the two are equal.

use crate::state::{ControlState, round_to_tenth};

/// Result of starting a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// The run began; the first tick must be scheduled.
    Started(ControlState),
    /// A run was already in progress; nothing changed.
    AlreadyRunning,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Still converging; schedule the next tick.
    Continue(ControlState),
    /// Current reached desired; the run is over.
    Stabilized(ControlState),
    /// No run in progress, so the tick was stale and did nothing.
    Idle,
}

/// Move `current` one step toward `desired`, clamping onto the target.
pub fn advance(current: f64, desired: f64, step: f64) -> f64 {
    if current < desired {
        round_to_tenth(current + step).min(desired)
    } else if current > desired {
        round_to_tenth(current - step).max(desired)
    } else {
        current
    }
}

/// Begin a run from Idle. Starting while running is a no-op.
pub fn start(state: ControlState) -> StartOutcome {
    if state.running {
        return StartOutcome::AlreadyRunning;
    }
    StartOutcome::Started(ControlState {
        iterations: 0,
        running: true,
        ..state
    })
}

/// Execute one tick body against `state`.
pub fn tick(state: ControlState) -> TickOutcome {
    if !state.running {
        return TickOutcome::Idle;
    }

    let next = ControlState {
        iterations: state.iterations.saturating_add(1),
        current_c: advance(state.current_c, state.desired_c, state.step_c),
        ..state
    };

    if next.is_stable() {
        TickOutcome::Stabilized(ControlState {
            running: false,
            ..next
        })
    } else {
        TickOutcome::Continue(next)
    }
}

/// Stop a run early. Returns `None` when there was nothing to stop.
pub fn cancel(state: ControlState) -> Option<ControlState> {
    state.running.then_some(ControlState {
        running: false,
        ..state
    })
}
