// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The engine task.
//!
//! One task owns the session, the clock, the dispatcher and every timer.
//! Control actions and timer deadlines are handled one at a time, so an
//! edit made between two steps is seen by the next step and nothing needs
//! a lock. Each session edit is written through to the store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::dispatch::TransportDispatcher;
use super::TransportState;
use crate::config::AppConfig;
use crate::control::{ControlAction, Debouncer, EngineHandle, TimeField};
use crate::error::ValidationError;
use crate::media::{resolve_duration, DurationLookup, TransportRack};
use crate::session::{RowConfig, SessionSnapshot, SessionStore};
use crate::timing::SequencerClock;

/// Something the engine reports to whoever drives the display
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A step fired
    Step(TransportState),
    /// The clock started, paused or was stopped and rewound
    Transport(TransportState),
    /// An edit was refused and nothing changed
    Rejected(ValidationError),
    /// A debounced time edit was committed
    TimeCommitted {
        row: usize,
        field: TimeField,
        seconds: f64,
    },
    /// A row's end offset was filled in from the clip's duration
    EndOffsetFilled { row: usize, seconds: f64 },
}

/// Owns the session and drives playback
pub struct Engine {
    session: SessionSnapshot,
    store: Box<dyn SessionStore>,
    clock: SequencerClock,
    dispatcher: TransportDispatcher,
    lookup: Option<Arc<dyn DurationLookup>>,
    /// Pending settings-editor time edits per (row, field)
    edits: BTreeMap<(usize, TimeField), Debouncer<String>>,
    edit_window: Duration,
    clip_watch_interval: Duration,
    next_clip_check: Option<Instant>,
    tx: UnboundedSender<ControlAction>,
    rx: Option<UnboundedReceiver<ControlAction>>,
    events: Option<UnboundedSender<EngineEvent>>,
}

impl Engine {
    /// Create an engine, loading the stored session
    pub fn new(store: Box<dyn SessionStore>, rack: TransportRack, config: &AppConfig) -> Self {
        let session = store.load();
        let (tx, rx) = mpsc::unbounded_channel();
        info!(bpm = session.bpm, cells = session.grid.len(), "session loaded");

        Self {
            clock: SequencerClock::new(session.bpm),
            session,
            store,
            dispatcher: TransportDispatcher::new(rack, config.seek_delay()),
            lookup: None,
            edits: BTreeMap::new(),
            edit_window: config.edit_debounce(),
            clip_watch_interval: config.clip_watch_interval(),
            next_clip_check: None,
            tx,
            rx: Some(rx),
            events: None,
        }
    }

    /// Fill in missing end offsets using this duration lookup
    pub fn with_lookup(mut self, lookup: Arc<dyn DurationLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Get a handle for sending actions
    pub fn handle(&self) -> EngineHandle {
        EngineHandle::new(self.tx.clone())
    }

    /// Receive engine events. Replaces any earlier subscriber.
    pub fn subscribe(&mut self) -> UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn session(&self) -> &SessionSnapshot {
        &self.session
    }

    pub fn transport(&self) -> TransportState {
        self.clock.transport()
    }

    pub fn rack_mut(&mut self) -> &mut TransportRack {
        self.dispatcher.rack_mut()
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.session) {
            error!(error = %e, "failed to save session");
        }
    }

    /// Earliest time any timer needs attention
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.clock.next_deadline(),
            self.dispatcher.next_deadline(),
            self.next_clip_check,
        ]
        .into_iter()
        .chain(self.edits.values().map(Debouncer::next_deadline))
        .flatten()
        .min()
    }

    fn start(&mut self, now: Instant) {
        if self.clock.is_running() {
            return;
        }
        self.clock.start(now);
        self.next_clip_check = Some(now + self.clip_watch_interval);
        info!(bpm = self.clock.bpm(), "transport started");
        self.emit(EngineEvent::Transport(self.clock.transport()));
    }

    fn pause(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        self.clock.stop();
        self.next_clip_check = None;
        info!(step = self.clock.current_step(), "transport paused");
        self.emit(EngineEvent::Transport(self.clock.transport()));
    }

    fn stop_and_reset(&mut self) {
        self.dispatcher
            .on_transport_stop(&self.session.rows, &mut self.clock);
        self.next_clip_check = None;
        info!("transport stopped");
        self.emit(EngineEvent::Transport(self.clock.transport()));
    }

    /// Apply one control action.
    ///
    /// Session edits are validated first; a rejected edit changes nothing.
    pub fn apply(&mut self, action: ControlAction, now: Instant) -> Result<(), ValidationError> {
        match action {
            ControlAction::TogglePlay => {
                if self.clock.is_running() {
                    self.pause();
                } else {
                    self.start(now);
                }
            }
            ControlAction::Play => self.start(now),
            ControlAction::Pause => self.pause(),
            ControlAction::Stop => self.stop_and_reset(),
            ControlAction::SetBpm(bpm) => {
                self.session.set_bpm(bpm)?;
                self.clock.set_bpm(bpm, now);
                self.persist();
            }
            ControlAction::SetSwing(swing) => {
                self.session.set_swing(swing)?;
                self.persist();
            }
            ControlAction::SetTimeSignature(signature) => {
                self.session.set_time_signature(signature)?;
                self.persist();
            }
            ControlAction::ToggleCell(row, col) => {
                let state = self.session.toggle_cell(row, col)?;
                debug!(row, col, ?state, "cell toggled");
                self.persist();
            }
            ControlAction::SetRowName(row, name) => {
                self.session.row_mut(row)?.set_name(name);
                self.persist();
            }
            ControlAction::SetMediaRef(row, media_ref) => {
                self.session.row_mut(row)?.set_media_ref(&media_ref)?;
                self.persist();
                self.request_duration(row);
            }
            ControlAction::EditTime(row, field, text) => {
                // Checked now against the row as it stands, and again on commit.
                let mut preview = self.session.row(row)?.clone();
                set_time_text(&mut preview, field, &text)?;
                let window = self.edit_window;
                self.edits
                    .entry((row, field))
                    .or_insert_with(|| Debouncer::new(window))
                    .call(text, now);
            }
            ControlAction::SetPlaybackRate(row, rate) => {
                self.session.row_mut(row)?.set_playback_rate(rate)?;
                self.persist();
                self.dispatcher.sync_playback_rate(&self.session.rows, row);
            }
            ControlAction::SetGain(row, gain) => {
                self.session.row_mut(row)?.set_gain(gain)?;
                self.persist();
            }
            ControlAction::DurationResolved {
                row,
                media_ref,
                seconds,
            } => self.fill_end_offset(row, &media_ref, seconds)?,
            ControlAction::Quit => {}
        }
        Ok(())
    }

    /// Ask for the clip length of a row that has media but no end offset
    fn request_duration(&self, row: usize) {
        let Some(lookup) = self.lookup.clone() else {
            return;
        };
        let Some(config) = self.session.rows.get(row) else {
            return;
        };
        if !config.has_media() || config.has_end() {
            return;
        }

        let media_ref = config.media_ref.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(seconds) = resolve_duration(&media_ref, lookup.as_ref()).await {
                let _ = tx.send(ControlAction::DurationResolved {
                    row,
                    media_ref,
                    seconds,
                });
            }
        });
    }

    fn fill_end_offset(
        &mut self,
        row: usize,
        media_ref: &str,
        seconds: f64,
    ) -> Result<(), ValidationError> {
        let config = self.session.row_mut(row)?;
        if config.media_ref != media_ref || config.has_end() {
            debug!(row, "row changed while its duration was looked up, ignoring");
            return Ok(());
        }
        if let Err(e) = config.set_end_offset(seconds) {
            debug!(row, seconds, error = %e, "clip duration unusable as end offset, ignoring");
            return Ok(());
        }
        self.persist();
        self.emit(EngineEvent::EndOffsetFilled { row, seconds });
        Ok(())
    }

    fn commit_time_edit(
        &mut self,
        row: usize,
        field: TimeField,
        text: &str,
    ) -> Result<f64, ValidationError> {
        let seconds = set_time_text(self.session.row_mut(row)?, field, text)?;
        self.persist();
        Ok(seconds)
    }

    /// Service every timer that has come due
    pub fn on_timer(&mut self, now: Instant) {
        if let Some(step) = self.clock.poll(now) {
            let active = self.dispatcher.dispatch_step(
                step,
                &self.session.grid,
                &self.session.rows,
                self.clock.active_row(),
                now,
            );
            self.clock.set_active_row(active);
            self.emit(EngineEvent::Step(self.clock.transport()));
        }

        self.dispatcher.fire_due_seeks(&self.session.rows, now);

        if self.next_clip_check.is_some_and(|due| due <= now) {
            self.dispatcher.enforce_clip_end(&self.session.rows);
            self.next_clip_check = Some(now + self.clip_watch_interval);
        }

        let due: Vec<_> = self
            .edits
            .iter_mut()
            .filter_map(|(key, debouncer)| debouncer.poll(now).map(|text| (*key, text)))
            .collect();
        self.edits.retain(|_, debouncer| debouncer.is_pending());
        for ((row, field), text) in due {
            match self.commit_time_edit(row, field, &text) {
                Ok(seconds) => self.emit(EngineEvent::TimeCommitted { row, field, seconds }),
                Err(e) => {
                    warn!(row, %field, error = %e, "time edit rejected");
                    self.emit(EngineEvent::Rejected(e));
                }
            }
        }
    }

    /// Run until `Quit` arrives. Returns the final session.
    pub async fn run(mut self) -> SessionSnapshot {
        let Some(mut commands) = self.rx.take() else {
            warn!("engine is already running");
            return self.session;
        };

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                action = commands.recv() => {
                    let Some(action) = action else { break };
                    if action == ControlAction::Quit {
                        break;
                    }
                    if let Err(e) = self.apply(action, now()) {
                        warn!(error = %e, "action rejected");
                        self.emit(EngineEvent::Rejected(e));
                    }
                }
                _ = sleep_until(deadline) => {
                    self.on_timer(now());
                }
            }
        }

        info!("engine shutting down");
        self.session
    }
}

/// Apply `mm:ss.ff` text to one clip boundary, returning the new offset
fn set_time_text(config: &mut RowConfig, field: TimeField, text: &str) -> Result<f64, ValidationError> {
    match field {
        TimeField::Start => {
            config.set_start_time(text)?;
            Ok(config.start_offset)
        }
        TimeField::End => {
            config.set_end_time(text)?;
            Ok(config.end_offset)
        }
    }
}

fn now() -> Instant {
    time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
