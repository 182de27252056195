// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Deferred transport commands.
//!
//! A Play cell starts its row's player immediately and seeks it to the
//! clip start a short while later, once the player has begun playback.
//! Those seeks wait here in a time-ordered queue until they come due.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Default delay between `play()` and the follow-up seek
pub const DEFAULT_SEEK_DELAY: Duration = Duration::from_millis(100);

/// A seek waiting to be issued
#[derive(Debug, Clone, Copy)]
pub struct ScheduledSeek {
    /// When the seek is due
    pub due: Instant,
    /// Row whose player is sought
    pub row: usize,
    /// Insertion order, keeps equal deadlines first-in first-out
    seq: u64,
}

// For BinaryHeap - we want the earliest deadline first
impl Eq for ScheduledSeek {}

impl PartialEq for ScheduledSeek {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Ord for ScheduledSeek {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledSeek {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Queue of seeks ordered by deadline
#[derive(Debug)]
pub struct SeekScheduler {
    queue: BinaryHeap<ScheduledSeek>,
    delay: Duration,
    next_seq: u64,
}

impl SeekScheduler {
    /// Create a scheduler with the given play-to-seek delay
    pub fn new(delay: Duration) -> Self {
        Self {
            queue: BinaryHeap::with_capacity(16),
            delay,
            next_seq: 0,
        }
    }

    /// Get the play-to-seek delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue a seek for `row`, due one delay after `now`.
    ///
    /// The seek carries no offset: it reads the row's start offset when
    /// it fires, so edits made in between take effect.
    pub fn schedule(&mut self, row: usize, now: Instant) {
        let seek = ScheduledSeek {
            due: now + self.delay,
            row,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.push(seek);
    }

    /// Remove and return the rows of every seek due at `now`, in deadline order
    pub fn poll(&mut self, now: Instant) -> Vec<usize> {
        let mut rows = Vec::new();
        while let Some(seek) = self.queue.peek() {
            if seek.due > now {
                break;
            }
            if let Some(seek) = self.queue.pop() {
                rows.push(seek.row);
            }
        }
        rows
    }

    /// Deadline of the earliest pending seek
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.peek().map(|seek| seek.due)
    }

    /// Drop every pending seek
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Get number of pending seeks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for SeekScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SEEK_DELAY)
    }
}
