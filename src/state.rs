// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Control state snapshot and its validated setters.
//!
//! Every setter consumes the snapshot and returns the next one; nothing here
//! touches timers or the presentation layer.

/// Lower bound of the desired-temperature slider, in degrees Celsius.
pub const DESIRED_MIN_C: f64 = 10.0;
/// Upper bound of the desired-temperature slider, in degrees Celsius.
pub const DESIRED_MAX_C: f64 = 30.0;

/// Lower bound of the step-size slider.
pub const STEP_MIN_C: f64 = 0.1;
/// Upper bound of the step-size slider.
pub const STEP_MAX_C: f64 = 1.0;

/// Desired and current temperature at startup and after a reset.
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
/// Step size at startup.
pub const DEFAULT_STEP_C: f64 = 0.1;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to the nearest 0.5, ties to even (25.25 -> 25.0, 25.75 -> 26.0).
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round_ties_even() / 2.0
}

/// Round to one decimal place, ties to even on the scaled value.
///
/// The result is always the double nearest to `n / 10`, so stepping by a
/// tenth lands exactly on targets that are multiples of 0.5.
///
/// Ties are decided on the scaled double, not on the exact binary value:
/// 0.15 (stored as 0.1499...) scales to exactly 1.5 and rounds to 0.2.
/// Values produced by the sliders and by stepping never sit on such a tie.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Where a desired-temperature change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The slider: values are rounded and kept inside the slider range.
    Slider,
    /// The text entry: values are rounded but never clamped.
    Text,
}

/// The whole simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// Target temperature set by the user.
    pub desired_c: f64,
    /// Simulated temperature driven toward `desired_c`.
    pub current_c: f64,
    /// Maximum change per tick. Always > 0.
    pub step_c: f64,
    /// Ticks executed since the current (or last) run started.
    pub iterations: u32,
    /// True while a run is in progress and a tick is pending.
    pub running: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            desired_c: DEFAULT_TEMPERATURE_C,
            current_c: DEFAULT_TEMPERATURE_C,
            step_c: DEFAULT_STEP_C,
            iterations: 0,
            running: false,
        }
    }
}

impl ControlState {
    /// Apply a desired temperature.
    ///
    /// Both sources round to the nearest 0.5. Only the slider clamps into
    /// [`DESIRED_MIN_C`, `DESIRED_MAX_C`]; typed values outside that range
    /// are accepted as-is.
    pub fn with_desired(self, value: f64, source: InputSource) -> Self {
        let rounded = round_to_half(value);
        let desired_c = match source {
            InputSource::Slider => rounded.clamp(DESIRED_MIN_C, DESIRED_MAX_C),
            InputSource::Text => rounded,
        };
        Self { desired_c, ..self }
    }

    /// Apply a step size coming from the step slider.
    ///
    /// The slider range is enforced here so the step can never round to zero.
    /// NaN falls back to [`STEP_MIN_C`].
    pub fn with_step(self, value: f64) -> Self {
        let value = if value.is_nan() { STEP_MIN_C } else { value };
        let step_c = round_to_tenth(value.clamp(STEP_MIN_C, STEP_MAX_C));
        Self { step_c, ..self }
    }

    /// Restore the default temperatures and stop.
    ///
    /// Step size and iteration count survive a reset.
    pub fn reset(self) -> Self {
        Self {
            desired_c: DEFAULT_TEMPERATURE_C,
            current_c: DEFAULT_TEMPERATURE_C,
            running: false,
            ..self
        }
    }

    /// True once the simulated temperature has reached the target.
    pub fn is_stable(&self) -> bool {
        self.current_c == self.desired_c
    }

    /// Absolute distance left to cover.
    pub fn remaining_c(&self) -> f64 {
        (self.desired_c - self.current_c).abs()
    }
}
