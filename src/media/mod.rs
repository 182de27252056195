// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Media transport abstraction layer.
//!
//! Every row owns a video player that lives outside this crate. The
//! sequencer only ever talks to it through [`MediaTransport`], addressed
//! by row index, so the player backend (an embedded iframe, a desktop
//! player, a test double) can be swapped freely.

pub mod duration;
pub mod iframe;
pub mod url;

pub use duration::{parse_iso8601_duration, DurationFuture, DurationLookup, YouTubeDataApi};
pub use iframe::{IframeMessage, IframeTransport};
pub use url::{extract_media_id, is_valid_media_url, resolve_duration, thumbnail_url};

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::sequencer::NUM_ROWS;

/// Playback control for one row's player.
///
/// Commands are fire-and-forget: a player that cannot act on one simply
/// ignores it.
pub trait MediaTransport: Send {
    /// Whether the player can accept commands yet
    fn is_ready(&self) -> bool {
        true
    }

    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Jump to a position in seconds
    fn seek_to(&mut self, seconds: f64);

    /// Current position in seconds
    fn current_time(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);
}

/// One player slot per row
pub struct TransportRack {
    slots: [Option<Box<dyn MediaTransport>>; NUM_ROWS],
}

impl TransportRack {
    /// Create a rack with no players attached
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Attach (or replace) the player for a row. Out-of-range rows are ignored.
    pub fn attach(&mut self, row: usize, transport: Box<dyn MediaTransport>) {
        if let Some(slot) = self.slots.get_mut(row) {
            *slot = Some(transport);
        }
    }

    /// Detach the player for a row
    pub fn detach(&mut self, row: usize) -> Option<Box<dyn MediaTransport>> {
        self.slots.get_mut(row).and_then(Option::take)
    }

    /// Get a row's player if it is attached and ready
    pub fn ready(&mut self, row: usize) -> Option<&mut dyn MediaTransport> {
        match self.slots.get_mut(row) {
            Some(Some(transport)) if transport.is_ready() => Some(transport.as_mut()),
            _ => {
                debug!(row, "transport unavailable, skipping");
                None
            }
        }
    }
}

impl Default for TransportRack {
    fn default() -> Self {
        Self::new()
    }
}

/// A command as seen by a player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Play,
    Pause,
    Stop,
    SeekTo(f64),
    SetPlaybackRate(f64),
}

impl fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportCommand::Play => write!(f, "play"),
            TransportCommand::Pause => write!(f, "pause"),
            TransportCommand::Stop => write!(f, "stop"),
            TransportCommand::SeekTo(secs) => write!(f, "seek to {:.2}s", secs),
            TransportCommand::SetPlaybackRate(rate) => write!(f, "rate {:.2}x", rate),
        }
    }
}

#[derive(Debug, Default)]
struct LogInner {
    commands: Vec<(usize, TransportCommand)>,
    positions: [f64; NUM_ROWS],
}

/// Shared log of commands received by [`RecordingTransport`]s
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<LogInner>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, row: usize, command: TransportCommand) {
        if let Ok(mut inner) = self.inner.lock() {
            if let TransportCommand::SeekTo(secs) = command {
                if let Some(pos) = inner.positions.get_mut(row) {
                    *pos = secs;
                }
            }
            inner.commands.push((row, command));
        }
    }

    /// Every command so far, in order, tagged with its row
    pub fn commands(&self) -> Vec<(usize, TransportCommand)> {
        self.inner
            .lock()
            .map(|inner| inner.commands.clone())
            .unwrap_or_default()
    }

    /// Commands received by one row
    pub fn commands_for(&self, row: usize) -> Vec<TransportCommand> {
        self.commands()
            .into_iter()
            .filter(|(r, _)| *r == row)
            .map(|(_, cmd)| cmd)
            .collect()
    }

    /// Pretend a row's player has reached a position
    pub fn set_position(&self, row: usize, seconds: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(pos) = inner.positions.get_mut(row) {
                *pos = seconds;
            }
        }
    }

    fn position(&self, row: usize) -> f64 {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.positions.get(row).copied())
            .unwrap_or(0.0)
    }

    /// Forget all recorded commands
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.commands.clear();
        }
    }
}

/// Player that records and logs what it is told to do.
///
/// Used headless and in tests; it reports the last sought position as
/// its current time unless the log overrides it.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    row: usize,
    log: CommandLog,
    ready: bool,
}

impl RecordingTransport {
    pub fn new(row: usize, log: CommandLog) -> Self {
        Self {
            row,
            log,
            ready: true,
        }
    }

    /// A player that has not finished loading
    pub fn not_ready(row: usize, log: CommandLog) -> Self {
        Self {
            ready: false,
            ..Self::new(row, log)
        }
    }

    fn record(&self, command: TransportCommand) {
        debug!(row = self.row, %command, "transport command");
        self.log.record(self.row, command);
    }
}

impl MediaTransport for RecordingTransport {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn play(&mut self) {
        self.record(TransportCommand::Play);
    }

    fn pause(&mut self) {
        self.record(TransportCommand::Pause);
    }

    fn stop(&mut self) {
        self.record(TransportCommand::Stop);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.record(TransportCommand::SeekTo(seconds));
    }

    fn current_time(&self) -> f64 {
        self.log.position(self.row)
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.record(TransportCommand::SetPlaybackRate(rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_transport() {
        let log = CommandLog::new();
        let mut transport = RecordingTransport::new(3, log.clone());

        transport.play();
        transport.seek_to(12.5);
        transport.stop();

        assert_eq!(
            log.commands_for(3),
            vec![
                TransportCommand::Play,
                TransportCommand::SeekTo(12.5),
                TransportCommand::Stop,
            ]
        );
        assert_eq!(transport.current_time(), 12.5);

        log.set_position(3, 40.0);
        assert_eq!(transport.current_time(), 40.0);
    }

    #[test]
    fn test_rack_skips_missing_and_unready() {
        let log = CommandLog::new();
        let mut rack = TransportRack::new();
        rack.attach(0, Box::new(RecordingTransport::new(0, log.clone())));
        rack.attach(1, Box::new(RecordingTransport::not_ready(1, log.clone())));
        rack.attach(42, Box::new(RecordingTransport::new(42, log.clone())));

        assert!(rack.ready(0).is_some());
        assert!(rack.ready(1).is_none());
        assert!(rack.ready(2).is_none());
        assert!(rack.ready(42).is_none());

        assert!(rack.detach(0).is_some());
        assert!(rack.ready(0).is_none());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(TransportCommand::SeekTo(1.5).to_string(), "seek to 1.50s");
        assert_eq!(TransportCommand::Play.to_string(), "play");
    }
}
