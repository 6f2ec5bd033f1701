//! sonare - Live transcript to sign-language asset queue
//!
//! Three file-connected stages follow a growing transcript and turn it into a
//! timed queue of sign assets: clean → glossify → stream.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod clean;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dedup;
pub mod defaults;
pub mod error;
pub mod follow;
pub mod gloss;
pub mod output;
pub mod pipeline;
pub mod stream;

// Stages
pub use clean::{CleanerStation, clean_text, segment};
pub use gloss::{GlossifierStation, Lexicon, QueueItem, SignRecord, build_queue};
pub use stream::{StreamState, StreamerStation, process_line};

// Following
pub use follow::{FollowEvent, Follower, LineFollower, ReopenReason, StartMode};

// Stage runtime
pub use pipeline::{
    ChannelSink, CollectorSink, ErrorReporter, FileSink, StageHandle, StageRunner, Station,
    StationError, StdoutSink, TextSink,
};

// Error handling
pub use error::{Result, SonareError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
