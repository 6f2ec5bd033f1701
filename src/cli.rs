//! Command-line interface for sonare
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live transcript to sign-language asset queue
#[derive(Parser, Debug)]
#[command(
    name = "sonare",
    version,
    about = "Live transcript to sign-language asset queue"
)]
pub struct Cli {
    /// Subcommand to execute (default: run all three stages)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug logs, -vv: trace logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a poll interval into seconds.
///
/// Supports bare numbers (seconds, fractional allowed) and any duration format
/// accepted by `humantime` (`150ms`, `2s`).
fn parse_poll_secs(s: &str) -> Result<f64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<f64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs_f64())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean a live transcript into one segment per line
    Clean(CleanArgs),

    /// Translate clean lines into timed sign queue records
    Glossify(GlossifyArgs),

    /// Stream playable assets from sign queue records
    Stream(StreamArgs),

    /// Run the cleaner, glossifier and streamer together
    Run(RunArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct CleanArgs {
    /// Live transcript to follow
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Clean transcript to append to
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Poll interval (e.g. 0.1, 150ms)
    #[arg(long, value_name = "DURATION", value_parser = parse_poll_secs)]
    pub poll: Option<f64>,

    /// Flush a trailing fragment after this many ms of silence (0 = never)
    #[arg(long, value_name = "MS")]
    pub idle_ms: Option<u64>,

    /// Process existing text from the start of the file
    #[arg(long)]
    pub from_start: bool,

    /// Do not echo emitted segments
    #[arg(long)]
    pub no_echo: bool,
}

#[derive(Args, Debug, Default)]
pub struct GlossifyArgs {
    /// Clean transcript to follow
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Sign queue (JSON lines) to append to
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Lexicon JSON file
    #[arg(long, visible_alias = "lex", value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Poll interval (e.g. 0.2, 200ms)
    #[arg(long, value_name = "DURATION", value_parser = parse_poll_secs)]
    pub poll: Option<f64>,

    /// Tween duration between clips in ms (0 = no tweens)
    #[arg(long, value_name = "MS")]
    pub tween_ms: Option<u64>,

    /// Pause recorded after each sentence; also the partial-line idle flush
    #[arg(long, value_name = "MS")]
    pub sentence_pause_ms: Option<u64>,

    /// Partial-line idle flush in ms, when different from the sentence pause
    #[arg(long, value_name = "MS")]
    pub idle_ms: Option<u64>,

    /// Playback rate (2.0 halves clip durations)
    #[arg(long, value_name = "RATE")]
    pub rate: Option<f64>,

    /// Process existing lines from the start of the file
    #[arg(long)]
    pub from_start: bool,

    /// Do not echo emitted records
    #[arg(long)]
    pub no_echo: bool,
}

#[derive(Args, Debug, Default)]
pub struct StreamArgs {
    /// Sign queue (JSON lines) to follow
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Final asset queue to append to
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Poll interval (e.g. 0.15, 150ms)
    #[arg(long, value_name = "DURATION", value_parser = parse_poll_secs)]
    pub poll: Option<f64>,

    /// Flush a partial record line after this many ms (0 = never)
    #[arg(long, value_name = "MS")]
    pub idle_ms: Option<u64>,

    /// Process existing records from the start of the file
    #[arg(long)]
    pub from_start: bool,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Live transcript to follow
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Lexicon JSON file
    #[arg(long, visible_alias = "lex", value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Playback rate (2.0 halves clip durations)
    #[arg(long, value_name = "RATE")]
    pub rate: Option<f64>,

    /// Process the existing live transcript from the start
    #[arg(long)]
    pub from_start: bool,
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (file + environment)
    Show,
    /// Print the configuration file path
    Path,
    /// Dump the default configuration as TOML
    Dump,
}

impl CleanArgs {
    pub fn apply(&self, config: &mut Config) {
        let cleaner = &mut config.cleaner;
        if let Some(source) = &self.source {
            cleaner.source = source.clone();
        }
        if let Some(out) = &self.out {
            cleaner.out = out.clone();
        }
        if let Some(poll) = self.poll {
            cleaner.poll_secs = poll;
        }
        if let Some(idle_ms) = self.idle_ms {
            cleaner.idle_ms = idle_ms;
        }
        if self.from_start {
            cleaner.from_start = true;
        }
        if self.no_echo {
            cleaner.echo = false;
        }
    }
}

impl GlossifyArgs {
    pub fn apply(&self, config: &mut Config) {
        let gloss = &mut config.glossifier;
        if let Some(source) = &self.source {
            gloss.source = source.clone();
        }
        if let Some(out) = &self.out {
            gloss.out = out.clone();
        }
        if let Some(lexicon) = &self.lexicon {
            gloss.lexicon = lexicon.clone();
        }
        if let Some(poll) = self.poll {
            gloss.poll_secs = poll;
        }
        if let Some(tween_ms) = self.tween_ms {
            gloss.tween_ms = tween_ms;
        }
        if let Some(pause) = self.sentence_pause_ms {
            gloss.sentence_pause_ms = pause;
            gloss.idle_ms = pause;
        }
        if let Some(idle_ms) = self.idle_ms {
            gloss.idle_ms = idle_ms;
        }
        if let Some(rate) = self.rate {
            gloss.rate = rate;
        }
        if self.from_start {
            gloss.from_start = true;
        }
        if self.no_echo {
            gloss.echo = false;
        }
    }
}

impl StreamArgs {
    pub fn apply(&self, config: &mut Config) {
        let streamer = &mut config.streamer;
        if let Some(source) = &self.source {
            streamer.source = source.clone();
        }
        if let Some(out) = &self.out {
            streamer.out = out.clone();
        }
        if let Some(poll) = self.poll {
            streamer.poll_secs = poll;
        }
        if let Some(idle_ms) = self.idle_ms {
            streamer.idle_ms = idle_ms;
        }
        if self.from_start {
            streamer.from_start = true;
        }
    }
}

impl RunArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.cleaner.source = source.clone();
        }
        if let Some(lexicon) = &self.lexicon {
            config.glossifier.lexicon = lexicon.clone();
        }
        if let Some(rate) = self.rate {
            config.glossifier.rate = rate;
        }
        if self.from_start {
            config.cleaner.from_start = true;
        }
    }
}
