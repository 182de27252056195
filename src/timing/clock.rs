// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step clock.
//!
//! A fixed-interval clock that advances a 16-step pointer once per beat
//! (`60000 / bpm` milliseconds). The clock is poll-driven: the owner asks
//! for the next deadline, sleeps until then, and calls [`SequencerClock::poll`]
//! with the current time. All timestamps are passed in, so the clock itself
//! never reads the wall clock.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::sequencer::{TransportState, NUM_STEPS};

/// Slowest accepted tempo
pub const MIN_BPM: u32 = 60;
/// Fastest accepted tempo
pub const MAX_BPM: u32 = 200;
/// Tempo used for a fresh session
pub const DEFAULT_BPM: u32 = 120;

/// Clock run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Fixed-interval step clock
#[derive(Debug)]
pub struct SequencerClock {
    /// Current tempo in BPM
    bpm: u32,
    /// Current clock state
    state: ClockState,
    /// Step pointer and the row currently shown
    transport: TransportState,
    /// When the next step is due (only while running)
    next_tick: Option<Instant>,
}

impl SequencerClock {
    /// Create a stopped clock at the given tempo
    pub fn new(bpm: u32) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            state: ClockState::Stopped,
            transport: TransportState::default(),
            next_tick: None,
        }
    }

    /// Get the current tempo in BPM
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Get the current clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Get the runtime transport state
    pub fn transport(&self) -> TransportState {
        TransportState {
            is_running: self.is_running(),
            ..self.transport
        }
    }

    /// Get the current step (0-15)
    pub fn current_step(&self) -> usize {
        self.transport.current_step
    }

    /// Get the row currently shown as active, if any
    pub fn active_row(&self) -> Option<usize> {
        self.transport.active_row
    }

    /// Record the row that won the last step
    pub fn set_active_row(&mut self, row: Option<usize>) {
        self.transport.active_row = row;
    }

    /// Interval between steps: one beat
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(60_000 / self.bpm as u64)
    }

    /// Change tempo.
    ///
    /// A running clock restarts its interval from `now`; time already
    /// elapsed toward the next step is discarded.
    pub fn set_bpm(&mut self, bpm: u32, now: Instant) {
        let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        if bpm == self.bpm {
            return;
        }
        self.bpm = bpm;
        if self.is_running() {
            debug!(bpm, "tempo changed, restarting step interval");
            self.next_tick = Some(now + self.step_interval());
        }
    }

    /// Start ticking. The first step is due one interval after `now`.
    ///
    /// Does nothing if the clock is already running.
    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.state = ClockState::Running;
        self.transport.is_running = true;
        self.next_tick = Some(now + self.step_interval());
    }

    /// Halt ticking. Step and active row are kept.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.transport.is_running = false;
        self.next_tick = None;
    }

    /// Rewind to step 0 and clear the active row
    pub fn reset(&mut self) {
        self.transport.current_step = 0;
        self.transport.active_row = None;
    }

    /// When the next step is due, if running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Advance the step pointer if a step is due at `now`.
    ///
    /// Returns the new step. At most one step is produced per call; if
    /// the caller fell more than an interval behind, the missed steps
    /// are dropped rather than replayed in a burst.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }

        let interval = self.step_interval();
        let mut next = due + interval;
        if next <= now {
            next = now + interval;
        }
        self.next_tick = Some(next);

        self.transport.current_step = (self.transport.current_step + 1) % NUM_STEPS;
        Some(self.transport.current_step)
    }

    /// Get the time until the next step
    pub fn time_until_next_step(&self, now: Instant) -> Duration {
        match self.next_tick {
            Some(due) => due.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

impl Default for SequencerClock {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clock_creation() {
        let clock = SequencerClock::new(120);
        assert_eq!(clock.bpm(), 120);
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.current_step(), 0);
        assert_eq!(clock.active_row(), None);
        assert_eq!(clock.next_deadline(), None);
    }

    #[test]
    fn test_clock_bpm_clamping() {
        assert_eq!(SequencerClock::new(10).bpm(), MIN_BPM);
        assert_eq!(SequencerClock::new(500).bpm(), MAX_BPM);
    }

    #[test]
    fn test_step_interval() {
        assert_eq!(SequencerClock::new(120).step_interval(), ms(500));
        assert_eq!(SequencerClock::new(60).step_interval(), ms(1000));
        assert_eq!(SequencerClock::new(200).step_interval(), ms(300));
    }

    #[test]
    fn test_ticks_every_interval() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);

        assert_eq!(clock.poll(t0 + ms(499)), None);
        assert_eq!(clock.poll(t0 + ms(500)), Some(1));
        assert_eq!(clock.poll(t0 + ms(500)), None);
        assert_eq!(clock.poll(t0 + ms(1000)), Some(2));
        assert_eq!(clock.next_deadline(), Some(t0 + ms(1500)));
    }

    #[test]
    fn test_step_wraps_at_sixteen() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);

        let mut last = 0;
        for i in 1..=16 {
            last = clock.poll(t0 + ms(500 * i)).unwrap();
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);
        clock.start(t0 + ms(400));
        assert_eq!(clock.next_deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn test_stop_keeps_position() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);
        clock.poll(t0 + ms(500));
        clock.set_active_row(Some(3));

        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.current_step(), 1);
        assert_eq!(clock.active_row(), Some(3));
        assert_eq!(clock.poll(t0 + ms(5000)), None);

        clock.reset();
        assert_eq!(clock.current_step(), 0);
        assert_eq!(clock.active_row(), None);
    }

    #[test]
    fn test_tempo_change_restarts_interval() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);
        assert_eq!(clock.poll(t0 + ms(500)), Some(1));

        clock.set_bpm(60, t0 + ms(700));
        assert_eq!(clock.next_deadline(), Some(t0 + ms(1700)));
        assert_eq!(clock.poll(t0 + ms(1000)), None);
        assert_eq!(clock.poll(t0 + ms(1700)), Some(2));
        assert_eq!(clock.poll(t0 + ms(2700)), Some(3));
    }

    #[test]
    fn test_tempo_change_while_stopped() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.set_bpm(90, t0);
        assert_eq!(clock.bpm(), 90);
        assert_eq!(clock.next_deadline(), None);
    }

    #[test]
    fn test_late_poll_drops_missed_steps() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        clock.start(t0);

        assert_eq!(clock.poll(t0 + ms(1800)), Some(1));
        assert_eq!(clock.next_deadline(), Some(t0 + ms(2300)));
    }

    #[test]
    fn test_time_until_next_step() {
        let t0 = Instant::now();
        let mut clock = SequencerClock::new(120);
        assert_eq!(clock.time_until_next_step(t0), Duration::ZERO);
        clock.start(t0);
        assert_eq!(clock.time_until_next_step(t0 + ms(200)), ms(300));
    }
}
