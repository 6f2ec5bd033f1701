//! Application composition root.
//!
//! Builds stage runners from configuration and runs them on their own
//! threads until Ctrl+C or until a stage fails:
//! live transcript → clean → glossify → stream

use crate::clean::{CleanerStation, SegmenterConfig};
use crate::config::{CleanerConfig, Config, GlossifierConfig, StreamerConfig};
use crate::error::{Result, SonareError};
use crate::follow::{Follower, LineFollower, StartMode};
use crate::gloss::{GlossifierStation, Lexicon, QueueTiming};
use crate::pipeline::{FileSink, StageHandle, StageRunner, StdoutSink, TextSink};
use crate::stream::StreamerStation;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// How often the waiting task checks whether a stage has died.
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(200);

/// Build the cleaner: raw chunks from the live transcript → clean lines.
pub fn cleaner_runner(
    config: &CleanerConfig,
    quiet: bool,
) -> Result<StageRunner<CleanerStation, Follower>> {
    let source = Follower::open(
        &config.source,
        config.poll(),
        StartMode::from_start(config.from_start),
    )?;
    let segmenter = SegmenterConfig {
        idle: (config.idle_ms > 0).then(|| config.idle()),
        ..SegmenterConfig::default()
    };
    let station = CleanerStation::new(segmenter, Instant::now());
    Ok(StageRunner::new(station, source)
        .with_sink(Box::new(FileSink::create(&config.out)?))
        .with_pacing(config.pacing())
        .with_echo(config.echo && !quiet))
}

/// Build the glossifier: clean lines → JSON sign records.
///
/// The lexicon is loaded once here; a missing or unreadable lexicon is fatal.
pub fn glossifier_runner(
    config: &GlossifierConfig,
    quiet: bool,
) -> Result<StageRunner<GlossifierStation, LineFollower>> {
    let lexicon = Lexicon::load(&config.lexicon)?;
    if lexicon.is_empty() {
        info!(path = %config.lexicon.display(), "lexicon has no entries, queues will be empty");
    }
    let source = LineFollower::open(
        &config.source,
        config.poll(),
        StartMode::from_start(config.from_start),
        config.idle(),
    )?;
    let timing = QueueTiming {
        tween_ms: config.tween_ms,
        rate: config.rate,
    };
    let station = GlossifierStation::new(lexicon, timing, config.sentence_pause_ms);
    Ok(StageRunner::new(station, source)
        .with_sink(Box::new(FileSink::create(&config.out)?))
        .with_echo(config.echo && !quiet))
}

/// Build the streamer: JSON sign records → asset lines, also sent to `live`.
pub fn streamer_runner(
    config: &StreamerConfig,
    live: Box<dyn TextSink>,
) -> Result<StageRunner<StreamerStation, LineFollower>> {
    let source = LineFollower::open(
        &config.source,
        config.poll(),
        StartMode::from_start(config.from_start),
        config.idle(),
    )?;
    Ok(StageRunner::new(StreamerStation::new(), source)
        .with_sink(Box::new(FileSink::create(&config.out)?))
        .with_sink(live))
}

/// Start all three stages sharing one running flag.
///
/// Every runner is built before any thread starts, so a bad lexicon or an
/// unwritable output fails fast and nothing is left running.
pub fn spawn_pipeline(
    config: &Config,
    live: Box<dyn TextSink>,
    quiet: bool,
    running: Arc<AtomicBool>,
) -> Result<Vec<StageHandle>> {
    let cleaner = cleaner_runner(&config.cleaner, quiet)?;
    let glossifier = glossifier_runner(&config.glossifier, quiet)?;
    let streamer = streamer_runner(&config.streamer, live)?;

    let mut handles = Vec::with_capacity(3);
    let mut failure = None;
    for spawned in [
        StageHandle::spawn(cleaner, running.clone()),
        StageHandle::spawn(glossifier, running.clone()),
        StageHandle::spawn(streamer, running.clone()),
    ] {
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }
    match failure {
        Some(e) => {
            stop_all(handles);
            Err(e)
        }
        None => Ok(handles),
    }
}

pub async fn run_clean_command(config: &Config, quiet: bool) -> Result<()> {
    config.validate()?;
    let runner = cleaner_runner(&config.cleaner, quiet)?;
    announce(quiet, "clean", &config.cleaner.source, &config.cleaner.out);
    let handle = StageHandle::spawn(runner, Arc::new(AtomicBool::new(true)))?;
    wait_for_shutdown(vec![handle], quiet).await
}

pub async fn run_glossify_command(config: &Config, quiet: bool) -> Result<()> {
    config.validate()?;
    let runner = glossifier_runner(&config.glossifier, quiet)?;
    announce(
        quiet,
        "glossify",
        &config.glossifier.source,
        &config.glossifier.out,
    );
    let handle = StageHandle::spawn(runner, Arc::new(AtomicBool::new(true)))?;
    wait_for_shutdown(vec![handle], quiet).await
}

pub async fn run_stream_command(config: &Config, quiet: bool) -> Result<()> {
    config.validate()?;
    let runner = streamer_runner(&config.streamer, Box::new(StdoutSink))?;
    announce(quiet, "stream", &config.streamer.source, &config.streamer.out);
    let handle = StageHandle::spawn(runner, Arc::new(AtomicBool::new(true)))?;
    wait_for_shutdown(vec![handle], quiet).await
}

pub async fn run_pipeline_command(config: &Config, quiet: bool) -> Result<()> {
    config.validate()?;
    let handles = spawn_pipeline(
        config,
        Box::new(StdoutSink),
        quiet,
        Arc::new(AtomicBool::new(true)),
    )?;
    announce(quiet, "run", &config.cleaner.source, &config.streamer.out);
    wait_for_shutdown(handles, quiet).await
}

fn announce(quiet: bool, stage: &str, source: &std::path::Path, out: &std::path::Path) {
    if !quiet {
        eprintln!(
            "[{}] following {} -> {} (Ctrl+C to stop)",
            stage,
            source.display(),
            out.display()
        );
    }
}

/// Wait for Ctrl+C or for any stage to finish on its own, then stop all.
async fn wait_for_shutdown(handles: Vec<StageHandle>, quiet: bool) -> Result<()> {
    let mut ticker = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    let interrupted = tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.map(|()| true),
        _ = async {
            loop {
                ticker.tick().await;
                if handles.iter().any(StageHandle::is_finished) {
                    break;
                }
            }
        } => Ok(false),
    };
    if matches!(interrupted, Ok(true)) && !quiet {
        eprintln!("\nShutting down...");
    }

    if let Some(e) = stop_all(handles) {
        return Err(e);
    }
    interrupted
        .map(|_| ())
        .map_err(|e| SonareError::Other(format!("Failed to wait for Ctrl+C: {}", e)))
}

/// Stop every stage, returning the first failure.
fn stop_all(handles: Vec<StageHandle>) -> Option<SonareError> {
    let mut first_error = None;
    for handle in handles {
        let name = handle.name();
        match handle.stop() {
            Ok(stats) => info!(stage = name, ?stats, "stage stopped"),
            Err(e) => {
                error!(stage = name, error = %e, "stage failed");
                first_error.get_or_insert(e);
            }
        }
    }
    first_error
}
