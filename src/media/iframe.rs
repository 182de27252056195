// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Embedded-player backend.
//!
//! Encodes transport commands as the JSON messages the YouTube iframe
//! player accepts through `postMessage`, and hands them to whatever
//! bridges this process to the embedding page. Player status (ready,
//! current time) flows back through [`IframeStatus`].

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;

use super::MediaTransport;

/// An encoded command bound for one row's iframe
#[derive(Debug, Clone, PartialEq)]
pub struct IframeMessage {
    pub row: usize,
    pub payload: String,
}

#[derive(Serialize)]
struct PlayerCommand<'a> {
    event: &'static str,
    func: &'a str,
    args: Vec<Value>,
}

fn encode(func: &str, args: Vec<Value>) -> String {
    let command = PlayerCommand {
        event: "command",
        func,
        args,
    };
    // A struct of strings and JSON values always serializes.
    serde_json::to_string(&command).unwrap_or_default()
}

#[derive(Debug, Default)]
struct StatusInner {
    ready: bool,
    current_time: f64,
}

/// Player status reported back by the embedding page
#[derive(Debug, Clone, Default)]
pub struct IframeStatus {
    inner: Arc<Mutex<StatusInner>>,
}

impl IframeStatus {
    /// The player finished loading and accepts commands
    pub fn mark_ready(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.ready = true;
        }
    }

    /// The player reported its playback position
    pub fn report_time(&self, seconds: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.current_time = seconds;
        }
    }

    fn ready(&self) -> bool {
        self.inner.lock().map(|i| i.ready).unwrap_or(false)
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().map(|i| i.current_time).unwrap_or(0.0)
    }
}

/// Transport that drives an embedded iframe player
pub struct IframeTransport {
    row: usize,
    tx: UnboundedSender<IframeMessage>,
    status: IframeStatus,
}

impl IframeTransport {
    /// Create a transport for a row plus the status handle its page updates
    pub fn new(row: usize, tx: UnboundedSender<IframeMessage>) -> (Self, IframeStatus) {
        let status = IframeStatus::default();
        let transport = Self {
            row,
            tx,
            status: status.clone(),
        };
        (transport, status)
    }

    fn send(&self, func: &str, args: Vec<Value>) {
        let _ = self.tx.send(IframeMessage {
            row: self.row,
            payload: encode(func, args),
        });
    }
}

impl MediaTransport for IframeTransport {
    fn is_ready(&self) -> bool {
        self.status.ready() && !self.tx.is_closed()
    }

    fn play(&mut self) {
        self.send("playVideo", Vec::new());
    }

    fn pause(&mut self) {
        self.send("pauseVideo", Vec::new());
    }

    fn stop(&mut self) {
        self.send("stopVideo", Vec::new());
    }

    fn seek_to(&mut self, seconds: f64) {
        self.send("seekTo", vec![json!(seconds)]);
    }

    fn current_time(&self) -> f64 {
        self.status.current_time()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.send("setPlaybackRate", vec![json!(rate)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_command_encoding() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mut transport, _status) = IframeTransport::new(2, tx);

        transport.play();
        transport.seek_to(7.5);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.row, 2);
        assert_eq!(msg.payload, r#"{"event":"command","func":"playVideo","args":[]}"#);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.payload, r#"{"event":"command","func":"seekTo","args":[7.5]}"#);
    }

    #[test]
    fn test_ready_follows_status() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (transport, status) = IframeTransport::new(0, tx);
        assert!(!transport.is_ready());

        status.mark_ready();
        status.report_time(3.25);
        assert!(transport.is_ready());
        assert_eq!(transport.current_time(), 3.25);

        drop(rx);
        assert!(!transport.is_ready());
    }
}
