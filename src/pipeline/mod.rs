//! Stage runtime shared by the cleaner, glossifier and streamer.
//!
//! Each stage is a [`Station`] driven by a [`StageRunner`] over follower
//! events. Outputs are encoded to single lines and handed to every
//! [`TextSink`] of the stage. A [`StageHandle`] runs a stage on its own thread.

pub mod error;
pub mod runner;
pub mod sink;
pub mod station;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use runner::{StageHandle, StageRunner, StageStats};
pub use sink::{ChannelSink, CollectorSink, FileSink, StdoutSink, TextSink};
pub use station::Station;
