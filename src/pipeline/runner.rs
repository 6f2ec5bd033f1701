//! Synchronous stage loop and the thread handle that owns it.

use crate::error::{Result, SonareError};
use crate::follow::FollowEvent;
use crate::output::render_emission;
use crate::pipeline::error::{ErrorReporter, LogReporter, StationError};
use crate::pipeline::sink::TextSink;
use crate::pipeline::station::Station;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Counters collected over one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Input units received from the follower.
    pub inputs: u64,
    /// Lines written to the sinks.
    pub emitted: u64,
    /// Rotations and truncations observed on the input.
    pub reopens: u64,
    /// Recoverable station errors reported and skipped.
    pub recoverable_errors: u64,
}

/// Drives one station: follower events in, encoded lines out to every sink.
///
/// Single-threaded and cooperative. The only suspension points are the
/// follower's poll sleep and the optional pacing sleep after new data.
pub struct StageRunner<S, I>
where
    S: Station,
    I: Iterator<Item = FollowEvent<S::Input>>,
{
    station: S,
    source: I,
    sinks: Vec<Box<dyn TextSink>>,
    reporter: Arc<dyn ErrorReporter>,
    pacing: Option<Duration>,
    echo: bool,
}

impl<S, I> StageRunner<S, I>
where
    S: Station,
    I: Iterator<Item = FollowEvent<S::Input>>,
{
    pub fn new(station: S, source: I) -> Self {
        Self {
            station,
            source,
            sinks: Vec::new(),
            reporter: Arc::new(LogReporter),
            pacing: None,
            echo: false,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn TextSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sleep this long after each batch of new data, bounding the loop rate.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = (!pacing.is_zero()).then_some(pacing);
        self
    }

    /// Echo each emitted unit to the terminal.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn name(&self) -> &'static str {
        self.station.name()
    }

    pub fn station(&self) -> &S {
        &self.station
    }

    /// Run until `running` is cleared or the source ends.
    ///
    /// Returns the station with the stats so callers can inspect its
    /// counters after the run.
    pub fn run(mut self, running: &AtomicBool) -> Result<(S, StageStats)> {
        let name = self.station.name();
        let mut stats = StageStats::default();
        debug!(stage = name, sinks = self.sinks.len(), "stage started");

        while running.load(Ordering::SeqCst) {
            let Some(event) = self.source.next() else {
                break;
            };
            let now = Instant::now();
            let mut had_data = false;

            let outputs = match event {
                FollowEvent::Data(input) => {
                    stats.inputs += 1;
                    had_data = true;
                    match self.station.process(input, now) {
                        Ok(outputs) => outputs,
                        Err(StationError::Recoverable(msg)) => {
                            stats.recoverable_errors += 1;
                            self.reporter
                                .report(name, &StationError::Recoverable(msg));
                            Vec::new()
                        }
                        Err(fatal) => {
                            self.reporter.report(name, &fatal);
                            self.station.shutdown();
                            return Err(SonareError::Stage {
                                stage: name.to_string(),
                                message: fatal.to_string(),
                            });
                        }
                    }
                }
                FollowEvent::Idle => self.station.tick(now),
                FollowEvent::Reopened(reason) => {
                    stats.reopens += 1;
                    info!(stage = name, %reason, "input reopened");
                    self.station.on_reopen(reason);
                    Vec::new()
                }
            };

            for output in &outputs {
                if let Err(err) = self.emit(output) {
                    self.station.shutdown();
                    return Err(err);
                }
                stats.emitted += 1;
            }

            if had_data && let Some(pacing) = self.pacing {
                thread::sleep(pacing);
            }
        }

        self.station.shutdown();
        debug!(stage = name, ?stats, "stage stopped");
        Ok((self.station, stats))
    }

    fn emit(&mut self, output: &S::Output) -> Result<()> {
        let line = self
            .station
            .encode(output)
            .map_err(|err| SonareError::Stage {
                stage: self.station.name().to_string(),
                message: err.to_string(),
            })?;
        for sink in &mut self.sinks {
            sink.handle(&line)?;
        }
        if self.echo
            && let Some(text) = self.station.describe(output)
        {
            render_emission(self.station.name(), &text);
        }
        Ok(())
    }
}

/// A stage running on its own thread.
///
/// Stages started together share one running flag; stopping any handle asks
/// all of them to exit.
pub struct StageHandle {
    name: &'static str,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<StageStats>>>,
}

impl StageHandle {
    pub fn spawn<S, I>(runner: StageRunner<S, I>, running: Arc<AtomicBool>) -> Result<Self>
    where
        S: Station,
        I: Iterator<Item = FollowEvent<S::Input>> + Send + 'static,
    {
        let name = runner.name();
        let flag = running.clone();
        let thread = thread::Builder::new()
            .name(format!("sonare-{name}"))
            .spawn(move || runner.run(&flag).map(|(_, stats)| stats))?;
        Ok(Self {
            name,
            running,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once the stage loop has returned (error or end of input).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signal shutdown and wait for the stage loop to return.
    pub fn stop(mut self) -> Result<StageStats> {
        self.running.store(false, Ordering::SeqCst);
        let Some(thread) = self.thread.take() else {
            return Ok(StageStats::default());
        };
        thread.join().map_err(|panic_info| {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            SonareError::Stage {
                stage: self.name.to_string(),
                message: format!("thread panicked: {msg}"),
            }
        })?
    }
}
