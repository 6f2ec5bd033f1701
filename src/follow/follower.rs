//! Rotation- and truncation-safe file tailing.

use super::cursor::{CursorState, TailCursor};
use super::decode::Utf8Decoder;
use super::{FollowEvent, ReopenReason, StartMode};
use crate::error::{Result, SonareError};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

/// Create `path` (and its parent directories) if it does not exist yet.
///
/// Lets a stage start before its upstream writer has produced anything.
pub fn ensure_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

/// Tails an append-only file and yields newly appended text chunks.
///
/// Iterating never ends: when nothing new is available the follower sleeps
/// for the poll interval, re-checks the path for rotation or truncation and
/// yields [`FollowEvent::Idle`], so callers get a chance to run timers and
/// observe shutdown.
#[derive(Debug)]
pub struct Follower {
    path: PathBuf,
    poll: Duration,
    mode: StartMode,
    state: CursorState,
    decoder: Utf8Decoder,
}

impl Follower {
    pub fn open(path: impl Into<PathBuf>, poll: Duration, mode: StartMode) -> Result<Self> {
        let path = path.into();
        let cursor = ensure_file(&path)
            .and_then(|_| TailCursor::open(&path, mode))
            .map_err(|source| SonareError::FollowOpen {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), ?mode, "following");
        Ok(Self {
            path,
            poll,
            mode,
            state: CursorState::Attached(cursor),
            decoder: Utf8Decoder::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Bytes consumed from the current file, if attached.
    pub fn offset(&self) -> Option<u64> {
        match &self.state {
            CursorState::Attached(cursor) => Some(cursor.offset()),
            CursorState::Detached(_) => None,
        }
    }

    /// One follower step without the poll sleep.
    pub fn poll_now(&mut self) -> FollowEvent<String> {
        match self.read_step() {
            Some(text) => FollowEvent::Data(text),
            None => self.check_step(),
        }
    }

    fn read_step(&mut self) -> Option<String> {
        let CursorState::Attached(cursor) = &mut self.state else {
            return None;
        };
        let text = read_text(cursor, &mut self.decoder, &self.path);
        (!text.is_empty()).then_some(text)
    }

    /// Re-stat the path and drive the attached/detached transitions.
    fn check_step(&mut self) -> FollowEvent<String> {
        let reason = match &mut self.state {
            CursorState::Attached(cursor) => {
                let meta = match fs::metadata(&self.path) {
                    Ok(meta) => meta,
                    Err(err) => {
                        trace!(path = %self.path.display(), error = %err, "path unavailable, retrying");
                        return FollowEvent::Idle;
                    }
                };
                let Some(reason) = cursor.check(&meta) else {
                    return FollowEvent::Idle;
                };
                if reason == ReopenReason::Rotated {
                    // The replaced file may still hold bytes appended since the
                    // last read; deliver them before switching over.
                    let tail = read_text(cursor, &mut self.decoder, &self.path);
                    if !tail.is_empty() {
                        self.state = CursorState::Detached(reason);
                        return FollowEvent::Data(tail);
                    }
                }
                reason
            }
            CursorState::Detached(reason) => *reason,
        };

        self.state = CursorState::Detached(reason);
        self.decoder.reset();
        match TailCursor::open(&self.path, self.mode) {
            Ok(cursor) => {
                debug!(path = %self.path.display(), %reason, "reopened");
                self.state = CursorState::Attached(cursor);
                FollowEvent::Reopened(reason)
            }
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "reopen failed, retrying");
                FollowEvent::Idle
            }
        }
    }
}

fn read_text(cursor: &mut TailCursor, decoder: &mut Utf8Decoder, path: &Path) -> String {
    let mut raw = Vec::new();
    if let Err(err) = cursor.read_available(&mut raw) {
        debug!(path = %path.display(), error = %err, "read failed, retrying");
    }
    if raw.is_empty() {
        return String::new();
    }
    decoder.decode(&raw)
}

impl Iterator for Follower {
    type Item = FollowEvent<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(text) = self.read_step() {
            return Some(FollowEvent::Data(text));
        }
        std::thread::sleep(self.poll);
        Some(self.check_step())
    }
}
