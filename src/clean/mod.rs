//! Transcript cleaning: annotation stripping, segmentation and deduplication.

pub mod segmenter;
pub mod station;
pub mod text;

pub use segmenter::{Overflow, Segment, SegmenterConfig, Segmentation, Trigger, segment};
pub use station::{Acceptance, CleanerCounters, CleanerStation, Rejection};
pub use text::clean_text;
