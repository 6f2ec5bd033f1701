//! Cleaner stage: raw transcript chunks in, clean deduplicated segments out.

use crate::clean::segmenter::{SegmenterConfig, segment};
use crate::clean::text::clean_text;
use crate::dedup::RecentWindow;
use crate::defaults;
use crate::follow::ReopenReason;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Why a finalized segment was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing left after cleaning.
    Empty,
    /// Matches a recently emitted segment, ignoring case.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    Accepted(String),
    Rejected(Rejection),
}

/// Counters over the station's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanerCounters {
    pub emitted: u64,
    pub empty: u64,
    pub duplicates: u64,
    pub overflows: u64,
    pub dropped_chars: u64,
}

pub struct CleanerStation {
    config: SegmenterConfig,
    buffer: String,
    last_activity: Instant,
    recent: RecentWindow,
    counters: CleanerCounters,
}

impl CleanerStation {
    pub fn new(config: SegmenterConfig, now: Instant) -> Self {
        Self::with_dedup_window(config, defaults::CLEANER_DEDUP_WINDOW, now)
    }

    pub fn with_dedup_window(config: SegmenterConfig, window: usize, now: Instant) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_activity: now,
            recent: RecentWindow::new(window),
            counters: CleanerCounters::default(),
        }
    }

    /// Clean a finalized segment and run it through the duplicate window.
    pub fn accept(&mut self, raw: &str) -> Acceptance {
        let text = clean_text(raw);
        if text.is_empty() {
            self.counters.empty += 1;
            return Acceptance::Rejected(Rejection::Empty);
        }
        if !self.recent.admit(&text.to_lowercase()) {
            self.counters.duplicates += 1;
            debug!(segment = %text, "duplicate segment suppressed");
            return Acceptance::Rejected(Rejection::Duplicate);
        }
        self.counters.emitted += 1;
        Acceptance::Accepted(text)
    }

    /// Text received but not yet finalized.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn counters(&self) -> CleanerCounters {
        self.counters
    }

    fn cycle(&mut self, idle_elapsed: Duration, now: Instant) -> Vec<String> {
        let result = segment(&self.buffer, idle_elapsed, &self.config);
        if result.flushed_idle() {
            self.last_activity = now;
        }
        if let Some(overflow) = result.overflow {
            self.counters.overflows += 1;
            self.counters.dropped_chars += overflow.dropped_chars as u64;
            warn!(
                dropped = overflow.dropped_chars,
                kept = self.config.buffer_keep,
                "cleaner buffer overflow, oldest text discarded"
            );
        }
        self.buffer = result.remainder;

        result
            .segments
            .iter()
            .filter_map(|seg| match self.accept(&seg.text) {
                Acceptance::Accepted(text) => Some(text),
                Acceptance::Rejected(_) => None,
            })
            .collect()
    }
}

impl Station for CleanerStation {
    type Input = String;
    type Output = String;

    fn process(&mut self, chunk: String, now: Instant) -> Result<Vec<String>, StationError> {
        self.buffer.push_str(&chunk);
        self.last_activity = now;
        Ok(self.cycle(Duration::ZERO, now))
    }

    fn tick(&mut self, now: Instant) -> Vec<String> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let elapsed = now.saturating_duration_since(self.last_activity);
        self.cycle(elapsed, now)
    }

    fn on_reopen(&mut self, reason: ReopenReason) {
        debug!(%reason, pending = self.buffer.len(), "keeping pending text across reopen");
    }

    fn encode(&self, output: &String) -> Result<String, StationError> {
        Ok(output.clone())
    }

    fn describe(&self, output: &String) -> Option<String> {
        Some(output.clone())
    }

    fn name(&self) -> &'static str {
        "clean"
    }

    fn shutdown(&mut self) {
        if !self.buffer.trim().is_empty() {
            debug!(pending = self.buffer.len(), "dropping unfinalized text");
        }
    }
}
