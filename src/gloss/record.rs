use crate::gloss::queue::QueueItem;
use serde::{Deserialize, Serialize};

/// One glossifier output record, written as a single JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRecord {
    /// The accepted input line.
    #[serde(default)]
    pub input: String,
    /// Full gloss sequence, including glosses with no lexicon entry.
    #[serde(default)]
    pub gloss: Vec<String>,
    #[serde(default)]
    pub queue: Vec<QueueItem>,
    #[serde(default)]
    pub sentence_pause_ms: u64,
}

impl SignRecord {
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn clip_count(&self) -> usize {
        self.queue.iter().filter(|item| item.is_clip()).count()
    }
}
