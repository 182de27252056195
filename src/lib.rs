// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! VIDSEQ - a step sequencer whose samples are clips of online videos.
//!
//! Each of eight rows is bound to a video URL and an in/out range. A
//! 16-step grid of Off/Play/Stop cells, read by a tempo-driven clock,
//! decides when each row's player starts, seeks and stops.

pub mod config;
pub mod control;
pub mod error;
pub mod media;
pub mod sequencer;
pub mod session;
pub mod timing;

pub use config::AppConfig;
pub use control::{ControlAction, EngineHandle, TimeField};
pub use error::{StoreError, ValidationError};
pub use media::{MediaTransport, TransportRack};
pub use sequencer::{Engine, EngineEvent, TransportState, NUM_ROWS, NUM_STEPS};
pub use session::{RowConfig, SessionSnapshot, SessionStore, TimeSignature};
