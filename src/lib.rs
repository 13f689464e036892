// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Interactive temperature control simulator.
//!
//! The core is a [`state::ControlState`] snapshot, a pure [`reducer`] that
//! advances it, and a [`controller::Controller`] that owns the tick timer and
//! fans events out to the presentation layer.

pub mod config;
pub mod controller;
pub mod error;
pub mod reducer;
pub mod scheduler;
pub mod state;
pub mod timer;
