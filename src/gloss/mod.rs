//! Gloss translation: tokenization, lexicon mapping and queue timing.

pub mod lexicon;
pub mod queue;
pub mod record;
pub mod station;
pub mod tokenize;

pub use lexicon::{Lexicon, LexiconEntry, LookupOutcome};
pub use queue::{QueueItem, QueueTiming, build_queue, scale_duration};
pub use record::SignRecord;
pub use station::GlossifierStation;
pub use tokenize::{glossify, normalize_line, tokenize};
