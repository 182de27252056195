// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the step clock that drives the grid and the
//! `mm:ss.ff` time codes used for clip offsets.

pub mod clock;
pub mod timecode;

pub use clock::{ClockState, SequencerClock, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use timecode::{format_time, is_time_format, parse_time, ZERO_TIME};
