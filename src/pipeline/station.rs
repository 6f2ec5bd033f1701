//! Core station abstraction for the transcript stages.

use crate::follow::ReopenReason;
use crate::pipeline::error::StationError;
use std::time::Instant;

/// A processing stage fed by a follower.
///
/// A station consumes input units (text chunks or lines) and produces zero or
/// more outputs per input. Time is passed in explicitly so idle behaviour can
/// be exercised without a real clock.
pub trait Station: Send + 'static {
    /// The input type this station receives.
    type Input: Send + 'static;
    /// The output type this station produces.
    type Output: Send + 'static;

    /// Processes newly arrived input.
    ///
    /// Returns:
    /// - `Ok(outputs)` - Successfully processed (possibly nothing to emit)
    /// - `Err(StationError)` - Processing failed
    fn process(
        &mut self,
        input: Self::Input,
        now: Instant,
    ) -> Result<Vec<Self::Output>, StationError>;

    /// Called when a poll found nothing new. Idle-triggered output goes here.
    fn tick(&mut self, _now: Instant) -> Vec<Self::Output> {
        Vec::new()
    }

    /// Called after the input file was rotated or truncated and reopened.
    fn on_reopen(&mut self, _reason: ReopenReason) {}

    /// Renders an output as the single line written to the stage's sinks.
    fn encode(&self, output: &Self::Output) -> Result<String, StationError>;

    /// Human-readable summary of an output for terminal echo.
    fn describe(&self, _output: &Self::Output) -> Option<String> {
        None
    }

    /// Returns the name of this station for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the station is shutting down.
    ///
    /// Pending, not-yet-emitted input is dropped, not flushed.
    fn shutdown(&mut self) {}
}
