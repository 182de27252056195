// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control surface for the engine.
//!
//! Everything the user can do (transport buttons, tempo and swing
//! controls, grid clicks, the row settings editor) arrives at the engine
//! as a [`ControlAction`] sent through an [`EngineHandle`].

pub mod debounce;

pub use debounce::{Debouncer, DEFAULT_EDIT_DEBOUNCE};

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::session::TimeSignature;

/// Which clip boundary a time edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => write!(f, "start"),
            TimeField::End => write!(f, "end"),
        }
    }
}

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    // Transport
    /// Start or halt the clock, keeping the position
    TogglePlay,
    /// Start the clock
    Play,
    /// Halt the clock, keeping the position
    Pause,
    /// Pause every video and rewind to step 0
    Stop,

    // Tempo
    /// Set tempo (60 - 200)
    SetBpm(u32),
    /// Set swing (0 - 100)
    SetSwing(u32),
    SetTimeSignature(TimeSignature),

    // Grid
    /// Cycle a cell (row, column)
    ToggleCell(usize, usize),

    // Row settings
    SetRowName(usize, String),
    /// Bind a row to a media URL; empty clears it
    SetMediaRef(usize, String),
    /// Clip start or end as `mm:ss.ff` text, debounced
    EditTime(usize, TimeField, String),
    SetPlaybackRate(usize, f64),
    SetGain(usize, f64),

    /// A duration lookup finished for the given media URL
    DurationResolved {
        row: usize,
        media_ref: String,
        seconds: f64,
    },

    /// Shut the engine down
    Quit,
}

/// Cloneable sender side of the engine's command channel
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<ControlAction>,
}

impl EngineHandle {
    pub fn new(tx: UnboundedSender<ControlAction>) -> Self {
        Self { tx }
    }

    /// Queue an action. Returns false once the engine has shut down.
    pub fn send(&self, action: ControlAction) -> bool {
        match self.tx.send(action) {
            Ok(()) => true,
            Err(e) => {
                warn!(action = ?e.0, "engine is gone, dropping action");
                false
            }
        }
    }

    pub fn toggle_play(&self) -> bool {
        self.send(ControlAction::TogglePlay)
    }

    pub fn stop(&self) -> bool {
        self.send(ControlAction::Stop)
    }

    pub fn toggle_cell(&self, row: usize, col: usize) -> bool {
        self.send(ControlAction::ToggleCell(row, col))
    }

    pub fn quit(&self) -> bool {
        self.send(ControlAction::Quit)
    }

    /// Whether the engine is still listening
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}
