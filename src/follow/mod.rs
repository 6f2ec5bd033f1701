//! Live-file following shared by every stage.
//!
//! A [`Follower`] tails an append-only file and survives truncation and
//! replacement (log rotation). A [`LineFollower`] layers line splitting and an
//! optional idle flush of the trailing partial line on top of it.

pub mod cursor;
pub mod decode;
pub mod follower;
pub mod lines;

use std::fmt;

pub use cursor::{CursorState, FileIdentity, TailCursor};
pub use decode::Utf8Decoder;
pub use follower::Follower;
pub use lines::{LineBuffer, LineFollower};

/// Where a freshly opened (or reopened) file is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Read existing content from offset 0.
    Beginning,
    /// Skip existing content and only deliver what is appended later.
    #[default]
    End,
}

impl StartMode {
    pub fn from_start(from_start: bool) -> Self {
        if from_start {
            StartMode::Beginning
        } else {
            StartMode::End
        }
    }
}

/// Why a follower dropped its handle and reopened the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReopenReason {
    /// The path now refers to a different file.
    Rotated,
    /// Same file, but shorter than what was already read.
    Truncated,
}

impl fmt::Display for ReopenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReopenReason::Rotated => write!(f, "rotated"),
            ReopenReason::Truncated => write!(f, "truncated"),
        }
    }
}

/// One step of a follower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowEvent<T> {
    /// Newly appended content (a text chunk, or a complete line in line mode).
    Data(T),
    /// Nothing new arrived during the last poll.
    Idle,
    /// The file was rotated or truncated and has been reopened.
    Reopened(ReopenReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_mode_from_flag() {
        assert_eq!(StartMode::from_start(true), StartMode::Beginning);
        assert_eq!(StartMode::from_start(false), StartMode::End);
        assert_eq!(StartMode::default(), StartMode::End);
    }

    #[test]
    fn test_reopen_reason_display() {
        assert_eq!(ReopenReason::Rotated.to_string(), "rotated");
        assert_eq!(ReopenReason::Truncated.to_string(), "truncated");
    }
}
