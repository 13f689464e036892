// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Controller: the interface the presentation layer talks to.
//!
//! Owns the current [`ControlState`], the single pending tick and the run's
//! [`CancelToken`]. Input handlers feed [`Action`]s through the reducer and
//! the resulting effects become timer operations and [`ControlEvent`]s for
//! subscribers. Everything runs on the caller's thread.

use crate::error::{self, ParseError};
use crate::reducer::{self, Action, Effect};
use crate::state::{self, ControlState, DEFAULT_TEMPERATURE_C, InputSource};
use crate::timer::{CancelToken, TickTimer};
use std::time::{Duration, Instant};

/// Notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// The chart points changed (or a tick ran) and must be redrawn.
    Redraw { current_c: f64, desired_c: f64 },
    /// The run converged.
    Stabilized { iterations: u32 },
    /// The run was cancelled before converging.
    Cancelled { iterations: u32 },
    /// Informational message for a dialog.
    Notice(String),
}

impl ControlEvent {
    /// Dialog text for events that end a run or inform the user.
    pub fn message(&self) -> Option<String> {
        match self {
            ControlEvent::Redraw { .. } => None,
            ControlEvent::Stabilized { iterations } => Some(format!(
                "Temperature stabilized in {iterations} iterations."
            )),
            ControlEvent::Cancelled { iterations } => {
                Some(format!("Adjustment stopped after {iterations} iterations."))
            }
            ControlEvent::Notice(message) => Some(message.clone()),
        }
    }
}

type Listener = Box<dyn FnMut(&ControlEvent)>;

pub struct Controller {
    state: ControlState,
    timer: TickTimer,
    token: Option<CancelToken>,
    listeners: Vec<Listener>,
}

impl Controller {
    pub fn new(tick_interval: Duration) -> Self {
        Self::with_state(ControlState::default(), tick_interval)
    }

    /// Start from an arbitrary idle snapshot (e.g. a different initial temperature).
    ///
    /// Non-finite temperatures fall back to the defaults and the step goes
    /// through the step setter, so a run always has something to converge on.
    pub fn with_state(state: ControlState, tick_interval: Duration) -> Self {
        let finite_or_default = |value: f64| {
            if value.is_finite() {
                value
            } else {
                DEFAULT_TEMPERATURE_C
            }
        };
        let state = ControlState {
            desired_c: finite_or_default(state.desired_c),
            current_c: finite_or_default(state.current_c),
            running: false,
            ..state
        }
        .with_step(state.step_c);

        Self {
            state,
            timer: TickTimer::new(tick_interval),
            token: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn tick_interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_tick_pending(&self) -> bool {
        self.timer.is_armed()
    }

    /// Time left before the pending tick fires.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until(now)
    }

    /// Register a listener for every subsequent [`ControlEvent`].
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ControlEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // -----------------------------------------------------------------------
    // Input handlers
    // -----------------------------------------------------------------------

    pub fn on_desired_changed_by_slider(&mut self, value: f64) {
        self.dispatch(Action::SetDesired {
            value,
            source: InputSource::Slider,
        });
    }

    /// Parse and apply a typed desired temperature.
    ///
    /// On error the state is left untouched and nothing is emitted. Values
    /// that only overflow once rounded (e.g. `1e308`) are rejected too.
    pub fn on_desired_changed_by_text(&mut self, text: &str) -> Result<f64, ParseError> {
        let value = error::parse_temperature(text)
            .and_then(|value| {
                if state::round_to_half(value).is_finite() {
                    Ok(value)
                } else {
                    Err(ParseError::NotFinite(text.trim().to_string()))
                }
            })
            .inspect_err(|e| {
                log::warn!("Rejected desired temperature input: {e}");
            })?;
        self.dispatch(Action::SetDesired {
            value,
            source: InputSource::Text,
        });
        Ok(self.state.desired_c)
    }

    pub fn on_step_changed_by_slider(&mut self, value: f64) {
        self.dispatch(Action::SetStep(value));
    }

    /// Start a run if idle and return its cancellation token.
    ///
    /// Returns `None` when a run is already in progress.
    pub fn on_adjust_pressed(&mut self) -> Option<CancelToken> {
        if self.state.running {
            log::debug!("Adjust pressed while running, ignoring");
            return None;
        }
        let token = CancelToken::new();
        self.token = Some(token.clone());
        self.dispatch(Action::Start);
        log::info!(
            "Adjusting from {:.1}°C toward {:.1}°C in steps of {:.1}",
            self.state.current_c,
            self.state.desired_c,
            self.state.step_c
        );
        Some(token)
    }

    pub fn on_reset_pressed(&mut self) {
        self.dispatch(Action::Reset);
    }

    pub fn on_stop_pressed(&mut self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
        self.dispatch(Action::Cancel);
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Run one tick body now, consuming the pending tick if any.
    pub fn tick(&mut self) {
        self.timer.disarm();
        if self.is_cancelled() {
            self.dispatch(Action::Cancel);
            return;
        }
        self.dispatch(Action::Tick);
    }

    /// Fire the pending tick if it is due. Returns true when a tick ran.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if self.timer.take_due(now) {
            self.tick();
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn dispatch(&mut self, action: Action) {
        let reduction = reducer::reduce(self.state, action);
        self.state = reduction.state;

        let mut cancel_requested = false;
        for effect in reduction.effects {
            match effect {
                Effect::Redraw => self.emit(ControlEvent::Redraw {
                    current_c: self.state.current_c,
                    desired_c: self.state.desired_c,
                }),
                Effect::ScheduleTick => {
                    if self.is_cancelled() {
                        cancel_requested = true;
                    } else {
                        self.timer.arm(Instant::now());
                        log::debug!(
                            "Next tick armed after {} iterations: current {:.1}°C, desired {:.1}°C",
                            self.state.iterations,
                            self.state.current_c,
                            self.state.desired_c
                        );
                    }
                }
                Effect::CancelTick => {
                    self.timer.disarm();
                    if let Some(token) = self.token.take() {
                        token.cancel();
                    }
                }
                Effect::Stabilized { iterations } => {
                    log::info!(
                        "Temperature stabilized at {:.1}°C in {iterations} iterations",
                        self.state.current_c
                    );
                    self.token = None;
                    self.emit(ControlEvent::Stabilized { iterations });
                }
                Effect::Cancelled { iterations } => {
                    log::info!("Adjustment cancelled after {iterations} iterations");
                    self.emit(ControlEvent::Cancelled { iterations });
                }
                Effect::Notice(message) => self.emit(ControlEvent::Notice(message)),
            }
        }

        if cancel_requested {
            self.dispatch(Action::Cancel);
        }
    }

    fn emit(&mut self, event: ControlEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(ctl: &mut Controller) -> Rc<RefCell<Vec<ControlEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        ctl.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    fn controller_at(desired_c: f64, current_c: f64, step_c: f64) -> Controller {
        Controller::with_state(
            ControlState {
                desired_c,
                current_c,
                step_c,
                ..ControlState::default()
            },
            Duration::from_millis(1000),
        )
    }

    /// Tick until idle, returning the number of ticks executed.
    fn drive(ctl: &mut Controller) -> u32 {
        let mut ticks = 0;
        while ctl.is_running() {
            assert!(ctl.is_tick_pending(), "running without a pending tick");
            ctl.tick();
            ticks += 1;
            assert!(ticks < 10_000);
        }
        ticks
    }

    #[test]
    fn test_fifty_ticks_from_twenty() {
        let mut ctl = controller_at(25.0, 20.0, 0.1);
        let events = recorded(&mut ctl);

        assert!(ctl.on_adjust_pressed().is_some());
        assert_eq!(drive(&mut ctl), 50);
        assert_eq!(ctl.state().current_c, 25.0);
        assert!(!ctl.is_tick_pending());

        let events = events.borrow();
        assert_eq!(events.last(), Some(&ControlEvent::Stabilized { iterations: 50 }));
        let redraws = events
            .iter()
            .filter(|e| matches!(e, ControlEvent::Redraw { .. }))
            .count();
        assert_eq!(redraws, 50);
    }

    #[test]
    fn test_three_ticks_down() {
        let mut ctl = controller_at(22.0, 25.0, 1.0);
        let events = recorded(&mut ctl);
        ctl.on_adjust_pressed();
        assert_eq!(drive(&mut ctl), 3);

        let currents: Vec<f64> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ControlEvent::Redraw { current_c, .. } => Some(*current_c),
                _ => None,
            })
            .collect();
        assert_eq!(currents, vec![24.0, 23.0, 22.0]);
    }

    #[test]
    fn test_already_stable_stops_after_one_tick() {
        let mut ctl = Controller::new(Duration::from_millis(1000));
        let events = recorded(&mut ctl);
        ctl.on_adjust_pressed();
        ctl.tick();
        assert!(!ctl.is_running());
        assert_eq!(ctl.state().current_c, 25.0);
        assert_eq!(
            *events.borrow(),
            vec![
                ControlEvent::Redraw {
                    current_c: 25.0,
                    desired_c: 25.0
                },
                ControlEvent::Stabilized { iterations: 1 },
            ]
        );
    }

    #[test]
    fn test_text_entry_abc_is_rejected() {
        let mut ctl = Controller::new(Duration::from_millis(1000));
        let events = recorded(&mut ctl);
        let before = ctl.state();

        let result = ctl.on_desired_changed_by_text("abc");
        assert!(matches!(result, Err(ParseError::NotANumber(_))));
        assert_eq!(ctl.state(), before);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_text_entry_overflowing_on_rounding_is_rejected() {
        let mut ctl = Controller::new(Duration::from_millis(1000));
        let events = recorded(&mut ctl);
        let before = ctl.state();

        for text in ["1e308", "-1.7e308"] {
            let result = ctl.on_desired_changed_by_text(text);
            assert_eq!(result, Err(ParseError::NotFinite(text.to_string())));
            assert_eq!(ctl.state(), before);
        }
        assert!(events.borrow().is_empty());

        // The default run still converges at once.
        ctl.on_adjust_pressed();
        ctl.tick();
        assert!(!ctl.is_running());
    }

    #[test]
    fn test_with_state_replaces_non_finite_fields() {
        let mut ctl = Controller::with_state(
            ControlState {
                desired_c: f64::INFINITY,
                current_c: f64::NAN,
                step_c: f64::NAN,
                ..ControlState::default()
            },
            Duration::from_millis(1000),
        );
        let s = ctl.state();
        assert_eq!(s.desired_c, 25.0);
        assert_eq!(s.current_c, 25.0);
        assert_eq!(s.step_c, 0.1);

        ctl.on_adjust_pressed();
        assert_eq!(drive(&mut ctl), 1);
    }

    #[test]
    fn test_with_state_nan_step_keeps_fixed_steps() {
        let mut ctl = Controller::with_state(
            ControlState {
                desired_c: 25.0,
                current_c: 20.0,
                step_c: f64::NAN,
                ..ControlState::default()
            },
            Duration::from_millis(1000),
        );
        ctl.on_adjust_pressed();
        ctl.tick();
        assert_eq!(ctl.state().current_c, 20.1);
        assert_eq!(drive(&mut ctl), 49);
    }

    #[test]
    fn test_text_entry_accepts_out_of_range() {
        let mut ctl = Controller::new(Duration::from_millis(1000));
        assert_eq!(ctl.on_desired_changed_by_text("42.3"), Ok(42.5));
        assert_eq!(ctl.state().desired_c, 42.5);
    }

    #[test]
    fn test_slider_clamps() {
        let mut ctl = Controller::new(Duration::from_millis(1000));
        ctl.on_desired_changed_by_slider(25.3);
        assert_eq!(ctl.state().desired_c, 25.5);
        ctl.on_desired_changed_by_slider(99.0);
        assert_eq!(ctl.state().desired_c, 30.0);
    }

    #[test]
    fn test_double_start_keeps_single_chain() {
        let mut ctl = controller_at(25.0, 20.0, 0.1);
        assert!(ctl.on_adjust_pressed().is_some());
        ctl.tick();
        ctl.tick();
        let mid = ctl.state();

        assert!(ctl.on_adjust_pressed().is_none());
        assert_eq!(ctl.state(), mid);
        assert_eq!(ctl.state().iterations, 2);
        assert!(ctl.is_tick_pending());
    }

    #[test]
    fn test_retarget_mid_run() {
        let mut ctl = controller_at(25.0, 20.0, 1.0);
        ctl.on_adjust_pressed();
        ctl.tick();
        assert_eq!(ctl.state().current_c, 21.0);

        ctl.on_desired_changed_by_slider(19.0);
        assert!(ctl.is_tick_pending());
        ctl.tick();
        assert_eq!(ctl.state().current_c, 20.0);
        ctl.tick();
        assert_eq!(ctl.state().current_c, 19.0);
        assert!(!ctl.is_running());
        assert_eq!(ctl.state().iterations, 3);
    }

    #[test]
    fn test_token_cancels_at_next_tick() {
        let mut ctl = controller_at(25.0, 20.0, 0.1);
        let events = recorded(&mut ctl);
        let token = ctl.on_adjust_pressed().unwrap();
        ctl.tick();

        token.cancel();
        ctl.tick();
        assert!(!ctl.is_running());
        assert!(!ctl.is_tick_pending());
        assert_eq!(ctl.state().current_c, 20.1);
        assert_eq!(
            events.borrow().last(),
            Some(&ControlEvent::Cancelled { iterations: 1 })
        );
    }

    #[test]
    fn test_stop_pressed() {
        let mut ctl = controller_at(25.0, 20.0, 0.1);
        let token = ctl.on_adjust_pressed().unwrap();
        ctl.tick();
        ctl.on_stop_pressed();
        assert!(token.is_cancelled());
        assert!(!ctl.is_running());
        assert!(!ctl.is_tick_pending());

        // A stale tick after stopping does nothing.
        ctl.tick();
        assert_eq!(ctl.state().iterations, 1);

        // A new run gets a fresh token.
        let fresh = ctl.on_adjust_pressed().unwrap();
        assert!(!fresh.is_cancelled());
        assert_eq!(ctl.state().iterations, 0);
    }

    #[test]
    fn test_reset_mid_run() {
        let mut ctl = controller_at(12.0, 20.0, 0.5);
        let events = recorded(&mut ctl);
        let token = ctl.on_adjust_pressed().unwrap();
        ctl.tick();
        ctl.tick();
        ctl.on_reset_pressed();

        let s = ctl.state();
        assert_eq!((s.desired_c, s.current_c), (25.0, 25.0));
        assert!(!s.running);
        assert!(!ctl.is_tick_pending());
        assert!(token.is_cancelled());
        // Step size and iteration count are not part of the reset.
        assert_eq!(s.step_c, 0.5);
        assert_eq!(s.iterations, 2);
        assert_eq!(
            events.borrow().last(),
            Some(&ControlEvent::Notice(
                "Settings reset to default values.".to_string()
            ))
        );
    }

    #[test]
    fn test_poll_timer_respects_deadline() {
        let mut ctl = controller_at(25.0, 24.0, 1.0);
        ctl.on_adjust_pressed();
        let now = Instant::now();
        assert!(!ctl.poll_timer(now));
        assert!(ctl.poll_timer(now + Duration::from_secs(2)));
        assert!(!ctl.is_running());
    }

    #[test]
    fn test_with_state_starts_idle() {
        let ctl = Controller::with_state(
            ControlState {
                running: true,
                ..ControlState::default()
            },
            Duration::from_millis(10),
        );
        assert!(!ctl.is_running());
        assert!(!ctl.is_tick_pending());
    }

    #[test]
    fn test_event_messages() {
        assert_eq!(
            ControlEvent::Stabilized { iterations: 50 }.message().as_deref(),
            Some("Temperature stabilized in 50 iterations.")
        );
        assert_eq!(
            ControlEvent::Redraw {
                current_c: 1.0,
                desired_c: 2.0
            }
            .message(),
            None
        );
    }
}
