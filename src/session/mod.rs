// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session model.
//!
//! The session is everything that survives a restart: the eight row
//! configurations, the grid, tempo, swing and time signature. It is a
//! single aggregate owned by the engine; every mutation goes through a
//! validated method here and is then persisted by the owner.

pub mod row;
pub mod store;

pub use row::{RowConfig, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
pub use store::{FileStore, MemoryStore, SessionStore, STORAGE_KEY};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::sequencer::{CellGrid, CellState, NUM_ROWS};
use crate::timing::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

/// Widest swing setting
pub const MAX_SWING: u32 = 100;

/// Time signature choices offered to the user
pub const TIME_SIGNATURES: [TimeSignature; 4] = [
    TimeSignature::new(3, 4),
    TimeSignature::new(4, 4),
    TimeSignature::new(6, 8),
    TimeSignature::new(7, 8),
];

/// Time signature (stored and shown; the clock does not use it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    /// Beats per bar
    pub beats: u8,
    /// Note value of one beat
    pub note_value: u8,
}

impl TimeSignature {
    pub const fn new(beats: u8, note_value: u8) -> Self {
        Self { beats, note_value }
    }

    /// Whether this is one of the offered choices
    pub fn is_supported(&self) -> bool {
        TIME_SIGNATURES.contains(self)
    }

    /// Parse `B/N` text such as `6/8`
    pub fn parse(text: &str) -> Option<Self> {
        let (beats, note_value) = text.trim().split_once('/')?;
        Some(Self::new(beats.parse().ok()?, note_value.parse().ok()?))
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.note_value)
    }
}

/// The persisted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Exactly one configuration per row
    pub rows: [RowConfig; NUM_ROWS],
    /// Switched-on cells
    pub grid: CellGrid,
    /// Tempo in BPM (60 - 200)
    pub bpm: u32,
    /// Swing amount (0 - 100), stored only
    pub swing: u32,
    /// Time signature, stored only
    pub time_signature: TimeSignature,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            rows: std::array::from_fn(|_| RowConfig::default()),
            grid: CellGrid::new(),
            bpm: DEFAULT_BPM,
            swing: 0,
            time_signature: TimeSignature::default(),
        }
    }
}

impl SessionSnapshot {
    /// Borrow a row's settings
    pub fn row(&self, row: usize) -> Result<&RowConfig, ValidationError> {
        self.rows.get(row).ok_or(ValidationError::RowOutOfRange(row))
    }

    /// Mutably borrow a row's settings
    pub fn row_mut(&mut self, row: usize) -> Result<&mut RowConfig, ValidationError> {
        self.rows
            .get_mut(row)
            .ok_or(ValidationError::RowOutOfRange(row))
    }

    /// Cycle one grid cell, returning its new state
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<CellState, ValidationError> {
        self.grid.toggle(row, col)
    }

    pub fn set_bpm(&mut self, bpm: u32) -> Result<(), ValidationError> {
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(ValidationError::OutOfRange {
                field: "bpm",
                value: bpm as f64,
                min: MIN_BPM as f64,
                max: MAX_BPM as f64,
            });
        }
        self.bpm = bpm;
        Ok(())
    }

    pub fn set_swing(&mut self, swing: u32) -> Result<(), ValidationError> {
        if swing > MAX_SWING {
            return Err(ValidationError::OutOfRange {
                field: "swing",
                value: swing as f64,
                min: 0.0,
                max: MAX_SWING as f64,
            });
        }
        self.swing = swing;
        Ok(())
    }

    pub fn set_time_signature(&mut self, signature: TimeSignature) -> Result<(), ValidationError> {
        if !signature.is_supported() {
            return Err(ValidationError::UnsupportedTimeSignature {
                beats: signature.beats,
                note_value: signature.note_value,
            });
        }
        self.time_signature = signature;
        Ok(())
    }

    /// Check the invariants serde cannot express.
    ///
    /// Row count and cell bounds are already enforced by the types.
    pub fn check(&self) -> Result<(), String> {
        if !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(format!("bpm {} out of range", self.bpm));
        }
        if self.swing > MAX_SWING {
            return Err(format!("swing {} out of range", self.swing));
        }
        if !self.time_signature.is_supported() {
            return Err(format!("unsupported time signature {}", self.time_signature));
        }
        self.rows.iter().try_for_each(RowConfig::check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session() {
        let session = SessionSnapshot::default();
        assert_eq!(session.rows.len(), 8);
        assert!(session.rows.iter().all(|r| r.name == "Untitled" && !r.has_media()));
        assert!(session.grid.is_empty());
        assert_eq!(session.bpm, 120);
        assert_eq!(session.swing, 0);
        assert_eq!(session.time_signature, TimeSignature::new(4, 4));
        assert!(session.check().is_ok());
    }

    #[test]
    fn test_bpm_bounds() {
        let mut session = SessionSnapshot::default();
        session.set_bpm(60).unwrap();
        session.set_bpm(200).unwrap();
        assert!(session.set_bpm(59).is_err());
        assert!(session.set_bpm(201).is_err());
        assert_eq!(session.bpm, 200);
    }

    #[test]
    fn test_swing_bounds() {
        let mut session = SessionSnapshot::default();
        session.set_swing(100).unwrap();
        assert!(session.set_swing(101).is_err());
        assert_eq!(session.swing, 100);
    }

    #[test]
    fn test_time_signature_choices() {
        let mut session = SessionSnapshot::default();
        session.set_time_signature(TimeSignature::new(7, 8)).unwrap();
        assert_eq!(session.time_signature.to_string(), "7/8");

        let err = session
            .set_time_signature(TimeSignature::new(5, 4))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedTimeSignature { beats: 5, note_value: 4 }
        );
    }

    #[test]
    fn test_time_signature_parse() {
        assert_eq!(TimeSignature::parse("6/8"), Some(TimeSignature::new(6, 8)));
        assert_eq!(TimeSignature::parse(" 3/4 "), Some(TimeSignature::new(3, 4)));
        assert_eq!(TimeSignature::parse("waltz"), None);
    }

    #[test]
    fn test_row_lookup_bounds() {
        let mut session = SessionSnapshot::default();
        assert!(session.row(7).is_ok());
        assert_eq!(session.row(8).unwrap_err(), ValidationError::RowOutOfRange(8));
        assert!(session.row_mut(9).is_err());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut session = SessionSnapshot::default();
        session.toggle_cell(1, 2).unwrap();
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["rows"].as_array().unwrap().len(), 8);
        assert_eq!(json["grid"][0]["state"], "play");
        assert_eq!(json["timeSignature"]["noteValue"], 4);
        assert_eq!(json["bpm"], 120);
    }

    #[test]
    fn test_wrong_row_count_rejected() {
        let mut json = serde_json::to_value(SessionSnapshot::default()).unwrap();
        json["rows"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<SessionSnapshot>(json).is_err());
    }
}
