use crate::error::{Result, SonareError};
use crossbeam_channel::Sender;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Pluggable line output for a stage.
///
/// Every emitted unit reaches each sink of its stage as one line, without the
/// trailing newline.
pub trait TextSink: Send + 'static {
    /// Handle one emitted line.
    fn handle(&mut self, line: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Appends each line to a file and flushes it immediately so downstream
/// followers see it without delay.
///
/// The file is reopened in append mode for every line, so an out-of-band
/// truncation or replacement of the output is picked up by the next write.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create the output (and its parent directories) if missing.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        crate::follow::follower::ensure_file(&path).map_err(|source| SonareError::SinkWrite {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSink for FileSink {
    fn handle(&mut self, line: &str) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            // One write per line, so a follower never sees half a record.
            file.write_all(format!("{line}\n").as_bytes())?;
            file.flush()
        };
        write().map_err(|source| SonareError::SinkWrite {
            path: self.path.clone(),
            source,
        })
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Live notification on stdout, one line per emitted unit.
pub struct StdoutSink;

impl TextSink for StdoutSink {
    fn handle(&mut self, line: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Live notification for in-process consumers.
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl TextSink for ChannelSink {
    fn handle(&mut self, line: &str) -> Result<()> {
        self.tx
            .send(line.to_string())
            .map_err(|_| SonareError::ChannelClosed)
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Keeps every line in memory. Clones share the same storage, so one clone
/// can be handed to a runner and the other inspected afterwards.
#[derive(Clone, Default)]
pub struct CollectorSink {
    collected: Arc<Mutex<Vec<String>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TextSink for CollectorSink {
    fn handle(&mut self, line: &str) -> Result<()> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
