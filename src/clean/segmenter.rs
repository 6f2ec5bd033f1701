//! Multi-trigger segmentation of the cleaner's pending buffer.
//!
//! One call is one cycle. Triggers are tried in priority order and a lower
//! trigger only runs when every higher one produced nothing:
//!
//! 1. newline: every complete line is drained
//! 2. punctuation: every complete sentence ending in `.`, `!` or `?`
//! 3. idle: the whole remainder, once the buffer has been idle long enough
//!
//! The function is pure: the caller owns the buffer, the clock and the
//! decision of what to do with the segments.

use crate::defaults;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

// A run such as `...` or `?!` terminates one sentence.
#[allow(clippy::expect_used)]
static TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// What finalized a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Newline,
    Punctuation,
    Idle,
}

/// A finalized, not yet cleaned, piece of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub trigger: Trigger,
}

/// The buffer exceeded its limit and its oldest characters were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    pub dropped_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Idle time after which the remainder is flushed. `None` disables it.
    pub idle: Option<Duration>,
    /// Character count above which the remainder is trimmed.
    pub buffer_limit: usize,
    /// Trailing characters kept after trimming.
    pub buffer_keep: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            idle: Some(Duration::from_millis(defaults::CLEANER_IDLE_MS)),
            buffer_limit: defaults::CLEANER_BUFFER_LIMIT,
            buffer_keep: defaults::CLEANER_BUFFER_KEEP,
        }
    }
}

/// Result of one segmentation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub segments: Vec<Segment>,
    pub remainder: String,
    pub overflow: Option<Overflow>,
}

impl Segmentation {
    pub fn flushed_idle(&self) -> bool {
        self.segments.iter().any(|s| s.trigger == Trigger::Idle)
    }
}

/// Run one cycle over `buffer`, which has seen no new text for `idle_elapsed`.
pub fn segment(buffer: &str, idle_elapsed: Duration, config: &SegmenterConfig) -> Segmentation {
    let (mut segments, mut remainder) = drain_lines(buffer);

    if segments.is_empty() {
        let (sentences, rest) = drain_sentences(&remainder);
        segments = sentences;
        remainder = rest;
    }

    if segments.is_empty()
        && let Some(idle) = config.idle
        && idle_elapsed >= idle
        && !remainder.trim().is_empty()
    {
        segments.push(Segment {
            text: remainder.trim().to_string(),
            trigger: Trigger::Idle,
        });
        remainder.clear();
    }

    let overflow = trim_overflow(&mut remainder, config);
    Segmentation {
        segments,
        remainder,
        overflow,
    }
}

/// Split off every complete line. Blank lines are consumed silently.
fn drain_lines(buffer: &str) -> (Vec<Segment>, String) {
    let Some(last_newline) = buffer.rfind('\n') else {
        return (Vec::new(), buffer.to_string());
    };
    let segments = buffer[..last_newline]
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| Segment {
            text: line.to_string(),
            trigger: Trigger::Newline,
        })
        .collect();
    (segments, buffer[last_newline + 1..].to_string())
}

/// Split off every complete sentence, left to right.
fn drain_sentences(buffer: &str) -> (Vec<Segment>, String) {
    let mut segments = Vec::new();
    let mut start = 0;
    for terminator in TERMINATOR_RE.find_iter(buffer) {
        segments.push(Segment {
            text: buffer[start..terminator.end()].to_string(),
            trigger: Trigger::Punctuation,
        });
        start = terminator.end();
    }
    (segments, buffer[start..].to_string())
}

/// Keep only the trailing `buffer_keep` characters once over the limit.
fn trim_overflow(remainder: &mut String, config: &SegmenterConfig) -> Option<Overflow> {
    let chars = remainder.chars().count();
    if chars <= config.buffer_limit {
        return None;
    }
    let keep = config.buffer_keep.min(chars);
    let dropped_chars = chars - keep;
    let cut = remainder
        .char_indices()
        .nth(dropped_chars)
        .map_or(remainder.len(), |(idx, _)| idx);
    remainder.drain(..cut);
    Some(Overflow { dropped_chars })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(seg: &Segmentation) -> Vec<&str> {
        seg.segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn config() -> SegmenterConfig {
        SegmenterConfig::default()
    }

    const NO_IDLE: Duration = Duration::ZERO;

    #[test]
    fn test_newlines_drain_every_complete_line() {
        let seg = segment("one\ntwo\nthr", NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["one", "two"]);
        assert!(seg.segments.iter().all(|s| s.trigger == Trigger::Newline));
        assert_eq!(seg.remainder, "thr");
    }

    #[test]
    fn test_newline_has_priority_over_punctuation() {
        // The remainder holds a full sentence but newline already produced output.
        let seg = segment("a line\nHello. Wor", NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["a line"]);
        assert_eq!(seg.remainder, "Hello. Wor");

        // Next cycle: no newline left, punctuation applies.
        let seg = segment(&seg.remainder, NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["Hello."]);
        assert_eq!(seg.segments[0].trigger, Trigger::Punctuation);
        assert_eq!(seg.remainder, " Wor");
    }

    #[test]
    fn test_blank_lines_fall_through_to_punctuation() {
        let seg = segment("\n  \nDone! next", NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["Done!"]);
        assert_eq!(seg.remainder, " next");
    }

    #[test]
    fn test_sentences_drain_left_to_right() {
        let seg = segment("Hi. How are you? Fine! and", NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["Hi.", " How are you?", " Fine!"]);
        assert_eq!(seg.remainder, " and");
    }

    #[test]
    fn test_terminator_run_ends_one_sentence() {
        let seg = segment("Wait... what?! ok", NO_IDLE, &config());
        assert_eq!(texts(&seg), vec!["Wait...", " what?!"]);
    }

    #[test]
    fn test_idle_flush_requires_elapsed_window() {
        let cfg = config();
        let seg = segment("trailing words", Duration::from_millis(100), &cfg);
        assert!(seg.segments.is_empty());
        assert_eq!(seg.remainder, "trailing words");

        let seg = segment("trailing words ", Duration::from_millis(350), &cfg);
        assert_eq!(texts(&seg), vec!["trailing words"]);
        assert!(seg.flushed_idle());
        assert_eq!(seg.remainder, "");
    }

    #[test]
    fn test_idle_flush_skips_blank_remainder() {
        let seg = segment("   ", Duration::from_secs(5), &config());
        assert!(seg.segments.is_empty());
        assert_eq!(seg.remainder, "   ");
    }

    #[test]
    fn test_idle_never_fires_when_other_trigger_produced() {
        let seg = segment("Done. tail", Duration::from_secs(5), &config());
        assert_eq!(texts(&seg), vec!["Done."]);
        assert_eq!(seg.remainder, " tail");
    }

    #[test]
    fn test_idle_disabled() {
        let cfg = SegmenterConfig {
            idle: None,
            ..config()
        };
        let seg = segment("fragment", Duration::from_secs(60), &cfg);
        assert!(seg.segments.is_empty());
    }

    #[test]
    fn test_overflow_keeps_trailing_half() {
        let buffer: String = "ab".repeat(8200) + "z";
        let seg = segment(&buffer, NO_IDLE, &config());
        let kept = seg.remainder.chars().count();
        assert_eq!(kept, 8192);
        assert!(seg.remainder.ends_with('z'));
        assert_eq!(
            seg.overflow,
            Some(Overflow {
                dropped_chars: 16401 - 8192
            })
        );
    }

    #[test]
    fn test_overflow_counts_characters_not_bytes() {
        let cfg = SegmenterConfig {
            idle: None,
            buffer_limit: 4,
            buffer_keep: 2,
        };
        let seg = segment("ééééé", NO_IDLE, &cfg);
        assert_eq!(seg.remainder, "éé");
        assert_eq!(seg.overflow, Some(Overflow { dropped_chars: 3 }));
    }

    #[test]
    fn test_at_limit_is_not_overflow() {
        let buffer = "x".repeat(16384);
        let seg = segment(&buffer, NO_IDLE, &config());
        assert_eq!(seg.overflow, None);
        assert_eq!(seg.remainder.len(), 16384);
    }
}
