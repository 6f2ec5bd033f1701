//! Glossifier stage: cleaned lines in, timed sign records out.

use crate::dedup::RecentWindow;
use crate::defaults;
use crate::gloss::lexicon::Lexicon;
use crate::gloss::queue::{QueueTiming, build_queue};
use crate::gloss::record::SignRecord;
use crate::gloss::tokenize::{glossify, normalize_line};
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use std::time::Instant;
use tracing::trace;

pub struct GlossifierStation {
    lexicon: Lexicon,
    timing: QueueTiming,
    sentence_pause_ms: u64,
    recent: RecentWindow,
}

impl GlossifierStation {
    pub fn new(lexicon: Lexicon, timing: QueueTiming, sentence_pause_ms: u64) -> Self {
        Self {
            lexicon,
            timing,
            sentence_pause_ms,
            recent: RecentWindow::new(defaults::GLOSSIFIER_DEDUP_WINDOW),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Build the record for one raw line, or `None` when the line is blank or
    /// repeats the previous accepted line exactly.
    pub fn translate(&mut self, raw: &str) -> Option<SignRecord> {
        let line = normalize_line(raw);
        if line.is_empty() {
            return None;
        }
        if !self.recent.admit(&line) {
            trace!(line = %line, "repeated line skipped");
            return None;
        }
        let gloss = glossify(&line);
        let queue = build_queue(&gloss, &self.lexicon, self.timing);
        Some(SignRecord {
            input: line,
            gloss,
            queue,
            sentence_pause_ms: self.sentence_pause_ms,
        })
    }
}

impl Station for GlossifierStation {
    type Input = String;
    type Output = SignRecord;

    fn process(&mut self, line: String, _now: Instant) -> Result<Vec<SignRecord>, StationError> {
        Ok(self.translate(&line).into_iter().collect())
    }

    fn encode(&self, record: &SignRecord) -> Result<String, StationError> {
        record
            .to_json_line()
            .map_err(|e| StationError::Fatal(format!("record encoding failed: {e}")))
    }

    fn describe(&self, record: &SignRecord) -> Option<String> {
        Some(format!(
            "{:?} -> [{}] | {} items",
            record.input,
            record.gloss.join(", "),
            record.queue.len()
        ))
    }

    fn name(&self) -> &'static str {
        "glossify"
    }
}
