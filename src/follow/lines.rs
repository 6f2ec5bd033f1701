//! Line-mode following with an optional idle flush of the partial line.

use super::follower::Follower;
use super::{FollowEvent, StartMode};
use crate::error::Result;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Splits streamed text into complete lines.
///
/// A trailing partial line is held until its newline arrives, or, when an
/// idle timeout is configured, until no new text has arrived for that long.
#[derive(Debug)]
pub struct LineBuffer {
    pending: String,
    idle: Option<Duration>,
    last_activity: Instant,
}

impl LineBuffer {
    /// `idle` of zero disables the partial-line flush.
    pub fn new(idle: Duration, now: Instant) -> Self {
        Self {
            pending: String::new(),
            idle: (!idle.is_zero()).then_some(idle),
            last_activity: now,
        }
    }

    /// Append a chunk and return every line it completed, without newlines.
    pub fn push(&mut self, chunk: &str, now: Instant) -> Vec<String> {
        self.pending.push_str(chunk);
        self.last_activity = now;

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            lines.push(line[..pos].to_string());
        }
        lines
    }

    /// Release the partial line if it has been idle long enough.
    pub fn flush_idle(&mut self, now: Instant) -> Option<String> {
        let idle = self.idle?;
        if self.pending.is_empty() || now.saturating_duration_since(self.last_activity) < idle {
            return None;
        }
        self.last_activity = now;
        Some(std::mem::take(&mut self.pending))
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }
}

/// Yields complete lines from an underlying chunk follower.
///
/// Generic over the chunk source so the line logic can run against scripted
/// events as well as a real [`Follower`].
#[derive(Debug)]
pub struct LineFollower<S = Follower> {
    source: S,
    buffer: LineBuffer,
    ready: VecDeque<String>,
}

impl LineFollower<Follower> {
    pub fn open(
        path: impl Into<PathBuf>,
        poll: Duration,
        mode: StartMode,
        idle: Duration,
    ) -> Result<Self> {
        Ok(Self::new(Follower::open(path, poll, mode)?, idle))
    }
}

impl<S> LineFollower<S>
where
    S: Iterator<Item = FollowEvent<String>>,
{
    pub fn new(source: S, idle: Duration) -> Self {
        Self {
            source,
            buffer: LineBuffer::new(idle, Instant::now()),
            ready: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S> Iterator for LineFollower<S>
where
    S: Iterator<Item = FollowEvent<String>>,
{
    type Item = FollowEvent<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.ready.pop_front() {
            return Some(FollowEvent::Data(line));
        }

        let event = match self.source.next()? {
            FollowEvent::Data(chunk) => {
                self.ready.extend(self.buffer.push(&chunk, Instant::now()));
                match self.ready.pop_front() {
                    Some(line) => FollowEvent::Data(line),
                    None => FollowEvent::Idle,
                }
            }
            FollowEvent::Idle => match self.buffer.flush_idle(Instant::now()) {
                Some(line) => FollowEvent::Data(line),
                None => FollowEvent::Idle,
            },
            // The partial line was already read, so it survives the reopen.
            FollowEvent::Reopened(reason) => FollowEvent::Reopened(reason),
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::ReopenReason;

    fn data(s: &str) -> FollowEvent<String> {
        FollowEvent::Data(s.to_string())
    }

    #[test]
    fn test_push_splits_complete_lines() {
        let start = Instant::now();
        let mut buf = LineBuffer::new(Duration::ZERO, start);
        assert_eq!(buf.push("one\ntwo\nthr", start), vec!["one", "two"]);
        assert_eq!(buf.pending(), "thr");
        assert_eq!(buf.push("ee\n", start), vec!["three"]);
        assert_eq!(buf.pending(), "");
    }

    #[test]
    fn test_push_keeps_empty_lines() {
        let start = Instant::now();
        let mut buf = LineBuffer::new(Duration::ZERO, start);
        assert_eq!(buf.push("\n\nx\n", start), vec!["", "", "x"]);
    }

    #[test]
    fn test_idle_flush_disabled_with_zero_timeout() {
        let start = Instant::now();
        let mut buf = LineBuffer::new(Duration::ZERO, start);
        buf.push("partial", start);
        assert_eq!(buf.flush_idle(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_idle_flush_after_timeout() {
        let start = Instant::now();
        let idle = Duration::from_millis(250);
        let mut buf = LineBuffer::new(idle, start);
        buf.push("partial", start);

        assert_eq!(buf.flush_idle(start + Duration::from_millis(100)), None);
        assert_eq!(
            buf.flush_idle(start + Duration::from_millis(250)),
            Some("partial".to_string())
        );
        assert_eq!(buf.pending(), "");
        assert_eq!(buf.flush_idle(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_new_data_restarts_idle_clock() {
        let start = Instant::now();
        let idle = Duration::from_millis(250);
        let mut buf = LineBuffer::new(idle, start);
        buf.push("par", start);
        buf.push("tial", start + Duration::from_millis(200));
        assert_eq!(buf.flush_idle(start + Duration::from_millis(300)), None);
        assert!(buf.flush_idle(start + Duration::from_millis(450)).is_some());
    }

    #[test]
    fn test_line_follower_over_scripted_source() {
        let events = vec![
            data("hel"),
            FollowEvent::Idle,
            data("lo\nwor"),
            FollowEvent::Reopened(ReopenReason::Truncated),
            data("ld\nnext\n"),
        ];
        let lines: Vec<_> = LineFollower::new(events.into_iter(), Duration::ZERO).collect();
        assert_eq!(
            lines,
            vec![
                FollowEvent::Idle,
                FollowEvent::Idle,
                data("hello"),
                FollowEvent::Reopened(ReopenReason::Truncated),
                data("world"),
                data("next"),
            ]
        );
    }
}
