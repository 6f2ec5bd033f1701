//! Asset streaming: sign records in, a flat deduplicated asset list out.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

/// State carried across records for the lifetime of one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamState {
    /// Label of the last emitted clip. `None` when that clip had no label.
    pub last_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    /// The line is not a JSON record; carries the decoder message.
    Malformed(String),
    /// The record decoded but every clip was filtered or collapsed.
    NoPlayableClips,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Emitted(Vec<String>),
    Skipped(SkipReason),
}

// Items are decoded one by one so a single odd item does not drop the record.
#[derive(Deserialize)]
struct RecordView {
    #[serde(default)]
    queue: Vec<serde_json::Value>,
}

/// Label and asset of a `clip` item with a non-empty asset.
///
/// Only `type`, `label` and `asset` are read; a missing or non-string label
/// counts as empty and `dur_ms` is not looked at.
fn playable_clip(item: &serde_json::Value) -> Option<(&str, &str)> {
    if item.get("type").and_then(serde_json::Value::as_str) != Some("clip") {
        return None;
    }
    let asset = item
        .get("asset")
        .and_then(serde_json::Value::as_str)
        .filter(|asset| !asset.is_empty())?;
    let label = item
        .get("label")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    Some((label, asset))
}

/// Extract the playable assets of one record line.
///
/// A clip whose non-empty label equals the last emitted label is skipped,
/// within a record and across record boundaries.
pub fn process_line(state: &mut StreamState, line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }
    let record: RecordView = match serde_json::from_str(line) {
        Ok(record) => record,
        Err(err) => return LineOutcome::Skipped(SkipReason::Malformed(err.to_string())),
    };

    let mut assets = Vec::new();
    for value in &record.queue {
        let Some((label, asset)) = playable_clip(value) else {
            continue;
        };
        if !label.is_empty() && state.last_label.as_deref() == Some(label) {
            continue;
        }
        assets.push(asset.to_string());
        state.last_label = (!label.is_empty()).then(|| label.to_string());
    }

    if assets.is_empty() {
        LineOutcome::Skipped(SkipReason::NoPlayableClips)
    } else {
        LineOutcome::Emitted(assets)
    }
}

#[derive(Debug, Default)]
pub struct StreamerStation {
    state: StreamState,
    malformed: u64,
}

impl StreamerStation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

impl Station for StreamerStation {
    type Input = String;
    type Output = String;

    fn process(&mut self, line: String, _now: Instant) -> Result<Vec<String>, StationError> {
        match process_line(&mut self.state, &line) {
            LineOutcome::Emitted(assets) => Ok(assets),
            LineOutcome::Skipped(SkipReason::Malformed(reason)) => {
                self.malformed += 1;
                debug!(%reason, "malformed record skipped");
                Ok(Vec::new())
            }
            LineOutcome::Skipped(_) => Ok(Vec::new()),
        }
    }

    fn encode(&self, asset: &String) -> Result<String, StationError> {
        Ok(asset.clone())
    }

    fn name(&self) -> &'static str {
        "stream"
    }
}
