// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types shared across the crate.
//!
//! Only two conditions ever reach a caller as an error: user input that
//! fails validation, and a session write that fails. Everything else
//! (unreadable snapshots, failed lookups, players that are not ready)
//! degrades to a default or a no-op and is logged instead.

use thiserror::Error;

/// Field-level validation failure surfaced to the editing surface.
///
/// A rejected edit never mutates the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Time text does not match `mm:ss.ff`
    #[error("Use format: mm:ss.ff (e.g. 01:30.50)")]
    InvalidTimeFormat(String),

    /// Start offset would not be before the end offset
    #[error("Start time must be before end time")]
    StartNotBeforeEnd { start: f64, end: f64 },

    /// End offset would not be after the start offset
    #[error("End time must be after start time")]
    EndNotAfterStart { start: f64, end: f64 },

    /// Media reference is not a recognised video URL
    #[error("Please enter a valid YouTube URL")]
    InvalidMediaUrl(String),

    /// Numeric field outside its accepted range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Time signature is not one of the offered choices
    #[error("Unsupported time signature {beats}/{note_value}")]
    UnsupportedTimeSignature { beats: u8, note_value: u8 },

    /// Row index outside the fixed row count
    #[error("Row {0} does not exist")]
    RowOutOfRange(usize),

    /// Column index outside the fixed step count
    #[error("Column {0} does not exist")]
    ColumnOutOfRange(usize),
}

/// Failure writing the session to durable storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::InvalidTimeFormat("abc".into());
        assert_eq!(err.to_string(), "Use format: mm:ss.ff (e.g. 01:30.50)");

        let err = ValidationError::OutOfRange {
            field: "bpm",
            value: 250.0,
            min: 60.0,
            max: 200.0,
        };
        assert_eq!(err.to_string(), "bpm must be between 60 and 200 (got 250)");
    }

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
