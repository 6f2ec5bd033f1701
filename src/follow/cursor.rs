//! Tail cursor and the attached/detached state machine around it.

use super::{ReopenReason, StartMode};
use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Identity of the file behind a path.
///
/// `(device, inode)` on Unix. Other platforms expose no stable identity, so
/// only truncation can be detected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    pub fn of(meta: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn of(_meta: &Metadata) -> Option<Self> {
        None
    }
}

/// An open handle plus the identity it was opened with and the byte offset
/// consumed so far.
///
/// The offset only grows while the identity is unchanged.
#[derive(Debug)]
pub struct TailCursor {
    file: File,
    identity: Option<FileIdentity>,
    offset: u64,
}

impl TailCursor {
    /// Open `path` and position the cursor according to `mode`.
    pub fn open(path: &Path, mode: StartMode) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let meta = file.metadata()?;
        let offset = match mode {
            StartMode::Beginning => 0,
            StartMode::End => file.seek(SeekFrom::End(0))?,
        };
        Ok(Self {
            file,
            identity: FileIdentity::of(&meta),
            offset,
        })
    }

    /// Append everything up to the current end of file to `buf`.
    ///
    /// The offset advances by the bytes actually read, even when the read
    /// fails part way through.
    pub fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let start = buf.len();
        let result = self.file.read_to_end(buf);
        let read = buf.len() - start;
        self.offset += read as u64;
        result.map(|_| read)
    }

    /// Compare the cursor against fresh metadata of its path.
    pub fn check(&self, meta: &Metadata) -> Option<ReopenReason> {
        if FileIdentity::of(meta) != self.identity {
            Some(ReopenReason::Rotated)
        } else if meta.len() < self.offset {
            Some(ReopenReason::Truncated)
        } else {
            None
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Follower handle state.
#[derive(Debug)]
pub enum CursorState {
    /// Reading from an open handle.
    Attached(TailCursor),
    /// The old handle was dropped; the path is reopened on the next poll.
    Detached(ReopenReason),
}

impl CursorState {
    pub fn is_attached(&self) -> bool {
        matches!(self, CursorState::Attached(_))
    }
}
