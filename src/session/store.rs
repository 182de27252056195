// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session persistence.
//!
//! The whole session is written as one JSON document under a fixed key
//! after every change, and read once at startup. Loading never fails:
//! a missing document gives the default session, and an unreadable one
//! is logged and replaced by the default session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::SessionSnapshot;
use crate::error::StoreError;

/// Key the session is stored under
pub const STORAGE_KEY: &str = "video-druum-machine-state";

/// Durable storage for one session document
pub trait SessionStore: Send {
    /// Read the stored document, `Ok(None)` if nothing was stored yet
    fn read_raw(&self) -> io::Result<Option<String>>;

    /// Replace the stored document
    fn write_raw(&mut self, contents: &str) -> io::Result<()>;

    /// Serialize and store the session
    fn save(&mut self, session: &SessionSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(session)?;
        self.write_raw(&json)?;
        Ok(())
    }

    /// Load the stored session, falling back to defaults
    fn load(&self) -> SessionSnapshot {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored session, starting fresh");
                return SessionSnapshot::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to read stored session, using defaults");
                return SessionSnapshot::default();
            }
        };

        match decode(&raw) {
            Ok(session) => session,
            Err(reason) => {
                warn!(%reason, "stored session is corrupt, using defaults");
                SessionSnapshot::default()
            }
        }
    }
}

fn decode(raw: &str) -> Result<SessionSnapshot, String> {
    let session: SessionSnapshot = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    session.check()?;
    Ok(session)
}

/// Session stored as a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store the session at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the session as `<dir>/<STORAGE_KEY>.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn read_raw(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_raw(&mut self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)
    }
}

/// In-memory store, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw stored document
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    /// The raw stored document
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SessionStore for MemoryStore {
    fn read_raw(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write_raw(&mut self, contents: &str) -> io::Result<()> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TimeSignature;
    use tempfile::TempDir;

    fn edited_session() -> SessionSnapshot {
        let mut session = SessionSnapshot::default();
        session.rows[2].set_name("Drop");
        session.rows[2]
            .set_media_ref("https://youtu.be/dQw4w9WgXcQ")
            .unwrap();
        session.rows[2].set_end_offset(42.5).unwrap();
        session.rows[2].set_start_offset(1.25).unwrap();
        session.toggle_cell(2, 0).unwrap();
        session.toggle_cell(6, 15).unwrap();
        session.toggle_cell(6, 15).unwrap();
        session.set_bpm(94).unwrap();
        session.set_swing(30).unwrap();
        session.set_time_signature(TimeSignature::new(6, 8)).unwrap();
        session
    }

    #[test]
    fn test_missing_key_gives_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), SessionSnapshot::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let session = edited_session();
        store.save(&session).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_corrupt_payload_gives_defaults() {
        for raw in [
            "{not json",
            "[]",
            r#"{"rows":[],"grid":[],"bpm":120,"swing":0,"timeSignature":{"beats":4,"noteValue":4}}"#,
        ] {
            let store = MemoryStore::with_contents(raw);
            assert_eq!(store.load(), SessionSnapshot::default(), "payload {}", raw);
        }
    }

    #[test]
    fn test_out_of_range_values_give_defaults() {
        let mut json = serde_json::to_value(edited_session()).unwrap();
        json["bpm"] = 400.into();
        let store = MemoryStore::with_contents(json.to_string());
        assert_eq!(store.load(), SessionSnapshot::default());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::in_dir(dir.path().join("nested"));
        assert_eq!(store.load(), SessionSnapshot::default());

        let session = edited_session();
        store.save(&session).unwrap();
        assert!(store.path().ends_with("video-druum-machine-state.json"));
        assert_eq!(FileStore::new(store.path()).load(), session);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.path(), "garbage").unwrap();
        assert_eq!(store.load(), SessionSnapshot::default());
    }
}
