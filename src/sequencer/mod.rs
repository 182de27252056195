// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core for triggering video clips from a step grid.
//!
//! This module provides the core sequencing infrastructure:
//! - The 8x16 cell grid and its Off/Play/Stop cycle
//! - Deferred seeks issued shortly after a row starts playing
//! - Per-step dispatch of player commands and active-row selection
//! - The engine task that owns the session and drives all timers

pub mod dispatch;
pub mod engine;
pub mod grid;
pub mod scheduler;

pub use dispatch::{resolve_active_row, TransportDispatcher};
pub use engine::{Engine, EngineEvent};
pub use grid::{Cell, CellGrid, CellState};
pub use scheduler::{ScheduledSeek, SeekScheduler, DEFAULT_SEEK_DELAY};

/// Number of rows (one video per row)
pub const NUM_ROWS: usize = 8;
/// Number of steps in the loop
pub const NUM_STEPS: usize = 16;

/// Runtime transport state, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportState {
    /// Whether the clock is ticking
    pub is_running: bool,
    /// Step most recently fired (0 - 15)
    pub current_step: usize,
    /// Row whose video is shown, if any
    pub active_row: Option<usize>,
}

impl TransportState {
    /// Step indicator text, counting from 1
    pub fn step_label(&self) -> String {
        format!("{:02}/{}", self.current_step + 1, NUM_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state_default() {
        let state = TransportState::default();
        assert!(!state.is_running);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.active_row, None);
        assert_eq!(state.step_label(), "01/16");
    }
}
