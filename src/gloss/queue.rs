//! Timed sign queue construction.

use crate::defaults;
use crate::gloss::lexicon::{Lexicon, LookupOutcome};
use serde::{Deserialize, Serialize};

/// One queue item, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueItem {
    #[serde(rename = "clip")]
    Clip {
        #[serde(default)]
        label: String,
        #[serde(default)]
        asset: Option<String>,
        #[serde(default)]
        dur_ms: u64,
    },
    /// Transition placeholder between two clips.
    #[serde(rename = "meta")]
    Tween {
        #[serde(default)]
        label: String,
        #[serde(default)]
        dur_ms: u64,
    },
    #[serde(other)]
    Other,
}

impl QueueItem {
    pub fn tween(dur_ms: u64) -> Self {
        Self::Tween {
            label: defaults::TWEEN_LABEL.to_string(),
            dur_ms,
        }
    }

    pub fn is_clip(&self) -> bool {
        matches!(self, Self::Clip { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueTiming {
    /// Tween inserted between consecutive clips; 0 disables tweens.
    pub tween_ms: u64,
    /// Playback rate; clip durations are divided by it.
    pub rate: f64,
}

impl Default for QueueTiming {
    fn default() -> Self {
        Self {
            tween_ms: defaults::TWEEN_MS,
            rate: defaults::PLAYBACK_RATE,
        }
    }
}

/// Scale a nominal duration by the playback rate, rounding half to even.
pub fn scale_duration(nominal_ms: f64, rate: f64) -> u64 {
    let rate = rate.max(defaults::MIN_PLAYBACK_RATE);
    // Float-to-int casts saturate, so negative durations become 0.
    (nominal_ms / rate).round_ties_even() as u64
}

/// Map glosses through the lexicon into clips separated by tweens.
///
/// Glosses without a lexicon entry contribute nothing. Tweens only ever sit
/// between two clips.
pub fn build_queue(gloss: &[String], lexicon: &Lexicon, timing: QueueTiming) -> Vec<QueueItem> {
    let mut queue = Vec::new();
    for g in gloss {
        let LookupOutcome::Found(entry) = lexicon.lookup(g) else {
            continue;
        };
        if timing.tween_ms > 0 && !queue.is_empty() {
            queue.push(QueueItem::tween(timing.tween_ms));
        }
        queue.push(QueueItem::Clip {
            label: entry.label.clone().unwrap_or_else(|| g.clone()),
            asset: entry.asset.clone(),
            dur_ms: scale_duration(entry.dur_ms, timing.rate),
        });
    }
    queue
}
