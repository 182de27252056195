// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step dispatch.
//!
//! Turns each fired step into player commands: Play cells start their
//! row and queue a seek to the clip start, Stop cells stop their row.
//! Also decides which row is shown as the active video.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::grid::{Cell, CellGrid, CellState};
use super::scheduler::SeekScheduler;
use crate::media::{MediaTransport, TransportRack};
use crate::session::RowConfig;
use crate::timing::SequencerClock;

/// Pick the row shown as active after a step.
///
/// `cells` must be ordered by row. The last Play cell wins, so the
/// highest Play row takes the screen. A step without Play cells keeps
/// the previous active row.
pub fn resolve_active_row(cells: &[Cell], previous: Option<usize>) -> Option<usize> {
    cells
        .iter()
        .rev()
        .find(|cell| cell.state == CellState::Play)
        .map(|cell| cell.row)
        .or(previous)
}

/// Issues player commands for fired steps
pub struct TransportDispatcher {
    /// One player per row
    rack: TransportRack,
    /// Seeks waiting for their player to start
    seeks: SeekScheduler,
    /// Rows whose clip is running from its start offset; a row joins
    /// once its follow-up seek has landed
    playing: BTreeSet<usize>,
}

impl TransportDispatcher {
    /// Create a dispatcher with the given play-to-seek delay
    pub fn new(rack: TransportRack, seek_delay: Duration) -> Self {
        Self {
            rack,
            seeks: SeekScheduler::new(seek_delay),
            playing: BTreeSet::new(),
        }
    }

    /// Get the player rack
    pub fn rack_mut(&mut self) -> &mut TransportRack {
        &mut self.rack
    }

    /// Rows currently watched against their end offset
    pub fn playing_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.playing.iter().copied()
    }

    /// Number of seeks still waiting
    pub fn pending_seeks(&self) -> usize {
        self.seeks.len()
    }

    /// Deadline of the earliest pending seek
    pub fn next_deadline(&self) -> Option<Instant> {
        self.seeks.next_deadline()
    }

    fn player<'a>(
        rack: &'a mut TransportRack,
        rows: &[RowConfig],
        row: usize,
    ) -> Option<&'a mut dyn MediaTransport> {
        if !rows.get(row).is_some_and(RowConfig::has_media) {
            return None;
        }
        rack.ready(row)
    }

    /// Dispatch one fired step and return the new active row.
    ///
    /// Rows without media and rows whose player is not ready are skipped
    /// for this step.
    pub fn dispatch_step(
        &mut self,
        step: usize,
        grid: &CellGrid,
        rows: &[RowConfig],
        previous_active: Option<usize>,
        now: Instant,
    ) -> Option<usize> {
        let cells = grid.cells_at_column(step);
        let active = resolve_active_row(&cells, previous_active);
        trace!(step, cells = cells.len(), ?active, "dispatching step");

        for cell in &cells {
            let Some(player) = Self::player(&mut self.rack, rows, cell.row) else {
                continue;
            };
            match cell.state {
                CellState::Play => {
                    player.play();
                    self.seeks.schedule(cell.row, now);
                    // The position is stale until the seek lands.
                    self.playing.remove(&cell.row);
                }
                CellState::Stop => {
                    player.stop();
                    self.playing.remove(&cell.row);
                }
                CellState::Off => {}
            }
        }

        active
    }

    /// Issue every seek that has come due.
    ///
    /// Each seek uses the row's start offset as it is now, not as it was
    /// when the seek was queued.
    pub fn fire_due_seeks(&mut self, rows: &[RowConfig], now: Instant) {
        for row in self.seeks.poll(now) {
            if let Some(player) = Self::player(&mut self.rack, rows, row) {
                player.seek_to(rows[row].start_offset);
                self.playing.insert(row);
            }
        }
    }

    /// Stop control: pause every row with media, then stop and rewind the clock.
    ///
    /// Pending seeks are dropped.
    pub fn on_transport_stop(&mut self, rows: &[RowConfig], clock: &mut SequencerClock) {
        for (row, config) in rows.iter().enumerate() {
            if !config.has_media() {
                continue;
            }
            if let Some(player) = self.rack.ready(row) {
                player.pause();
            }
        }
        self.seeks.clear();
        self.playing.clear();
        clock.stop();
        clock.reset();
    }

    /// Pause rows that have played past their end offset.
    ///
    /// Rows without an end offset play on. A row still waiting for its
    /// seek is not checked.
    pub fn enforce_clip_end(&mut self, rows: &[RowConfig]) {
        let playing: Vec<usize> = self.playing.iter().copied().collect();
        for row in playing {
            let Some(config) = rows.get(row) else {
                continue;
            };
            if !config.has_end() {
                continue;
            }
            let Some(player) = Self::player(&mut self.rack, rows, row) else {
                continue;
            };
            if player.current_time() >= config.end_offset {
                debug!(row, end = config.end_offset, "clip reached its end, pausing");
                player.pause();
                self.playing.remove(&row);
            }
        }
    }

    /// Push a row's playback rate to its player
    pub fn sync_playback_rate(&mut self, rows: &[RowConfig], row: usize) {
        if let Some(player) = Self::player(&mut self.rack, rows, row) {
            player.set_playback_rate(rows[row].playback_rate);
        }
    }
}
