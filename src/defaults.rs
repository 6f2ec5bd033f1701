//! Default configuration constants for sonare.
//!
//! Shared by the config types, the CLI and the stations so that the three
//! stages agree on their defaults.

/// Maximum pending characters the cleaner holds before trimming.
pub const CLEANER_BUFFER_LIMIT: usize = 16384;

/// Characters kept (from the tail) when the cleaner buffer overflows.
pub const CLEANER_BUFFER_KEEP: usize = 8192;

/// Number of accepted segments the cleaner remembers for deduplication.
pub const CLEANER_DEDUP_WINDOW: usize = 64;

/// Number of accepted lines the glossifier compares against.
///
/// Only the immediately preceding line counts as a repeat.
pub const GLOSSIFIER_DEDUP_WINDOW: usize = 1;

/// Upper bound on the cleaner's pacing sleep between loop iterations.
///
/// Keeps idle-timeout checks responsive when the poll interval is long.
pub const PACING_MAX_MS: u64 = 50;

/// Cleaner poll interval in seconds.
pub const CLEANER_POLL_SECS: f64 = 0.1;

/// Cleaner idle window in milliseconds before a trailing fragment is flushed.
pub const CLEANER_IDLE_MS: u64 = 350;

/// Glossifier poll interval in seconds.
pub const GLOSSIFIER_POLL_SECS: f64 = 0.2;

/// Pause after each sentence, also the glossifier's partial-line idle window.
pub const SENTENCE_PAUSE_MS: u64 = 250;

/// Transition placeholder between two consecutive clips.
pub const TWEEN_MS: u64 = 100;

/// Playback rate scaling factor (2.0 halves clip durations).
pub const PLAYBACK_RATE: f64 = 1.0;

/// Smallest rate used when scaling durations.
pub const MIN_PLAYBACK_RATE: f64 = 0.01;

/// Nominal clip duration for lexicon entries without `dur_ms`.
pub const CLIP_DURATION_MS: u64 = 1000;

/// Label written on tween queue items.
pub const TWEEN_LABEL: &str = "_TWEEN";

/// Streamer poll interval in seconds.
pub const STREAMER_POLL_SECS: f64 = 0.15;

/// Streamer partial-line idle window (0 disables partial flushing).
pub const STREAMER_IDLE_MS: u64 = 0;

/// Default file names, relative to the working directory.
pub const LIVE_TRANSCRIPT_FILE: &str = "live_transcript.txt";
pub const CLEAN_TRANSCRIPT_FILE: &str = "clean_transcript.txt";
pub const SIGN_QUEUE_FILE: &str = "sign_queue.jsonl";
pub const FINAL_QUEUE_FILE: &str = "final_queue.txt";
pub const LEXICON_FILE: &str = "lexicons.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_keep_is_half_the_limit() {
        assert_eq!(CLEANER_BUFFER_KEEP * 2, CLEANER_BUFFER_LIMIT);
    }

    #[test]
    fn glossifier_window_is_narrower_than_cleaner_window() {
        assert!(GLOSSIFIER_DEDUP_WINDOW < CLEANER_DEDUP_WINDOW);
    }
}
