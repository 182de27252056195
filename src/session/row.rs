// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-row clip settings.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::media::url::is_valid_media_url;
use crate::timing::{is_time_format, parse_time};

/// Slowest playback rate a player accepts
pub const MIN_PLAYBACK_RATE: f64 = 0.1;
/// Fastest playback rate a player accepts
pub const MAX_PLAYBACK_RATE: f64 = 2.0;

/// Settings for one row: which clip it plays and how.
///
/// An `end_offset` of zero means "not set yet" (it is normally filled in
/// from the clip's natural duration once a media URL is entered).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowConfig {
    /// Display name
    pub name: String,
    /// Raw media URL; empty means the row is silent
    pub media_ref: String,
    /// Clip start in seconds
    pub start_offset: f64,
    /// Clip end in seconds (0 = unset)
    pub end_offset: f64,
    /// Player speed (0.1 - 2.0)
    pub playback_rate: f64,
    /// Volume (0.0 - 1.0)
    pub gain: f64,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            media_ref: String::new(),
            start_offset: 0.0,
            end_offset: 0.0,
            playback_rate: 1.0,
            gain: 1.0,
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn parse_offset_text(text: &str) -> Result<f64, ValidationError> {
    if !text.is_empty() && !is_time_format(text) {
        return Err(ValidationError::InvalidTimeFormat(text.to_string()));
    }
    Ok(parse_time(text))
}

impl RowConfig {
    /// Whether this row has a clip to play
    pub fn has_media(&self) -> bool {
        !self.media_ref.is_empty()
    }

    /// Whether the end offset has been set
    pub fn has_end(&self) -> bool {
        self.end_offset > 0.0
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Point the row at a new clip. An empty string silences the row.
    pub fn set_media_ref(&mut self, media_ref: &str) -> Result<(), ValidationError> {
        let media_ref = media_ref.trim();
        if !media_ref.is_empty() && !is_valid_media_url(media_ref) {
            return Err(ValidationError::InvalidMediaUrl(media_ref.to_string()));
        }
        self.media_ref = media_ref.to_string();
        Ok(())
    }

    /// Set the clip start in seconds; must stay before a set end offset
    pub fn set_start_offset(&mut self, seconds: f64) -> Result<(), ValidationError> {
        let start = check_range("start offset", seconds, 0.0, f64::MAX)?;
        if self.has_end() && start >= self.end_offset {
            return Err(ValidationError::StartNotBeforeEnd {
                start,
                end: self.end_offset,
            });
        }
        self.start_offset = start;
        Ok(())
    }

    /// Set the clip end in seconds; must be after the start offset
    pub fn set_end_offset(&mut self, seconds: f64) -> Result<(), ValidationError> {
        let end = check_range("end offset", seconds, 0.0, f64::MAX)?;
        if end <= self.start_offset {
            return Err(ValidationError::EndNotAfterStart {
                start: self.start_offset,
                end,
            });
        }
        self.end_offset = end;
        Ok(())
    }

    /// Set the clip start from `mm:ss.ff` text
    pub fn set_start_time(&mut self, text: &str) -> Result<(), ValidationError> {
        let seconds = parse_offset_text(text)?;
        self.set_start_offset(seconds)
    }

    /// Set the clip end from `mm:ss.ff` text
    pub fn set_end_time(&mut self, text: &str) -> Result<(), ValidationError> {
        let seconds = parse_offset_text(text)?;
        self.set_end_offset(seconds)
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), ValidationError> {
        self.playback_rate = check_range("playback rate", rate, MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)?;
        Ok(())
    }

    pub fn set_gain(&mut self, gain: f64) -> Result<(), ValidationError> {
        self.gain = check_range("gain", gain, 0.0, 1.0)?;
        Ok(())
    }

    /// Check the invariants of a row read back from storage
    pub(crate) fn check(&self) -> Result<(), String> {
        if !self.start_offset.is_finite() || self.start_offset < 0.0 {
            return Err(format!("row '{}' has a bad start offset", self.name));
        }
        if !self.end_offset.is_finite() || self.end_offset < 0.0 {
            return Err(format!("row '{}' has a bad end offset", self.name));
        }
        if self.has_end() && self.end_offset <= self.start_offset {
            return Err(format!("row '{}' ends before it starts", self.name));
        }
        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&self.playback_rate) {
            return Err(format!("row '{}' has a bad playback rate", self.name));
        }
        if !(0.0..=1.0).contains(&self.gain) {
            return Err(format!("row '{}' has a bad gain", self.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_row_defaults() {
        let row = RowConfig::default();
        assert_eq!(row.name, "Untitled");
        assert!(!row.has_media());
        assert!(!row.has_end());
        assert_eq!(row.playback_rate, 1.0);
        assert_eq!(row.gain, 1.0);
    }

    #[test]
    fn test_media_ref_validation() {
        let mut row = RowConfig::default();
        assert!(row.set_media_ref(URL).is_ok());
        assert!(row.has_media());

        let err = row.set_media_ref("not a url").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMediaUrl(_)));
        assert_eq!(row.media_ref, URL);

        row.set_media_ref("").unwrap();
        assert!(!row.has_media());
    }

    #[test]
    fn test_start_before_end() {
        let mut row = RowConfig::default();
        row.set_end_time("01:00.00").unwrap();
        row.set_start_time("00:10.50").unwrap();
        assert_eq!(row.start_offset, 10.5);

        let err = row.set_start_time("01:00.00").unwrap_err();
        assert!(matches!(err, ValidationError::StartNotBeforeEnd { .. }));
        assert_eq!(row.start_offset, 10.5);

        let err = row.set_end_time("00:05").unwrap_err();
        assert!(matches!(err, ValidationError::EndNotAfterStart { .. }));
        assert_eq!(row.end_offset, 60.0);
    }

    #[test]
    fn test_unset_end_does_not_constrain_start() {
        let mut row = RowConfig::default();
        row.set_start_time("00:30").unwrap();
        assert_eq!(row.start_offset, 30.0);
    }

    #[test]
    fn test_bad_time_text() {
        let mut row = RowConfig::default();
        let err = row.set_start_time("half past").unwrap_err();
        assert_eq!(err, ValidationError::InvalidTimeFormat("half past".into()));
        assert_eq!(row.start_offset, 0.0);
    }

    #[test]
    fn test_rate_and_gain_ranges() {
        let mut row = RowConfig::default();
        row.set_playback_rate(0.5).unwrap();
        assert!(row.set_playback_rate(2.5).is_err());
        assert!(row.set_playback_rate(0.05).is_err());
        assert_eq!(row.playback_rate, 0.5);

        row.set_gain(0.0).unwrap();
        assert!(row.set_gain(1.1).is_err());
        assert!(row.set_gain(f64::NAN).is_err());
        assert_eq!(row.gain, 0.0);
    }

    #[test]
    fn test_check_rejects_negative_end() {
        let mut row = RowConfig::default();
        assert!(row.check().is_ok());
        row.end_offset = -3.0;
        assert!(row.check().is_err());
        row.end_offset = f64::INFINITY;
        assert!(row.check().is_err());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(RowConfig::default()).unwrap();
        assert_eq!(json["mediaRef"], "");
        assert_eq!(json["startOffset"], 0.0);
        assert_eq!(json["playbackRate"], 1.0);
    }
}
