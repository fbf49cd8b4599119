//! Append-only log of committed action packets.
//!
//! Records hold the exact codec bytes that were dispatched, so a log can be
//! fed back through the registry on any peer:
//!
//! ```text
//! [u32 length][bincode(ActionLogRecord)]
//! [u32 length][bincode(ActionLogRecord)]
//! ...
//! ```
//!
//! The length prefix is little-endian.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{RepositoryError, Result};

/// Upper bound on one encoded record. Larger length prefixes are treated as
/// corruption rather than allocated.
pub const MAX_RECORD_LEN: u32 = 64 * 1024;

const LEN_PREFIX: usize = 4;

/// One committed action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogRecord {
    /// Tick during which the action was committed.
    pub tick: u64,
    pub packet: Vec<u8>,
}

/// Writer for the action log.
///
/// A failed append poisons the log: the tail may hold a partial frame, so
/// every later append and flush is refused.
pub struct FileActionLog<W: Write = BufWriter<File>> {
    path: PathBuf,
    writer: W,
    current_offset: u64,
    poisoned: bool,
}

impl FileActionLog {
    /// Creates a new log, refusing to overwrite an existing one.
    pub fn create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename.as_ref());
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(
                path.display().to_string(),
            ));
        }

        let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
        tracing::debug!("Created action log: {}", path.display());

        Ok(Self::with_writer(path, BufWriter::new(file), 0))
    }

    /// Opens an existing log for appending, creating it if missing.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename.as_ref());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_offset = file.metadata()?.len();

        tracing::debug!(
            "Opened action log: {} at offset {}",
            path.display(),
            current_offset
        );

        Ok(Self::with_writer(path, BufWriter::new(file), current_offset))
    }
}

impl<W: Write> FileActionLog<W> {
    /// Wraps an arbitrary sink. `current_offset` is the number of bytes the
    /// sink already holds.
    pub fn with_writer(path: impl Into<PathBuf>, writer: W, current_offset: u64) -> Self {
        Self {
            path: path.into(),
            writer,
            current_offset,
            poisoned: false,
        }
    }

    /// Appends one record. Returns the byte offset it was written at.
    ///
    /// The whole frame is encoded up front and handed to the writer in a
    /// single `write_all`.
    pub fn append(&mut self, tick: u64, packet: &[u8]) -> Result<u64> {
        if self.poisoned {
            return Err(RepositoryError::LogPoisoned(self.path.display().to_string()));
        }

        let offset = self.current_offset;
        let record = ActionLogRecord {
            tick,
            packet: packet.to_vec(),
        };
        let data =
            bincode::serialize(&record).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(data.len())
            .ok()
            .filter(|&len| len <= MAX_RECORD_LEN)
            .ok_or(RepositoryError::RecordTooLarge {
                offset,
                len: u32::try_from(data.len()).unwrap_or(u32::MAX),
                max: MAX_RECORD_LEN,
            })?;

        let mut frame = Vec::with_capacity(LEN_PREFIX + data.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&data);

        if let Err(error) = self.writer.write_all(&frame) {
            self.poisoned = true;
            tracing::error!(
                path = %self.path.display(),
                offset,
                "Action log write failed, log poisoned: {error}"
            );
            return Err(error.into());
        }

        self.current_offset += frame.len() as u64;
        Ok(offset)
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.poisoned {
            return Err(RepositoryError::LogPoisoned(self.path.display().to_string()));
        }
        if let Err(error) = self.writer.flush() {
            self.poisoned = true;
            return Err(error.into());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

/// Sequential reader over an action log.
///
/// Yields records in file order. A record cut short by a crash is reported
/// as [`RepositoryError::Truncated`] and ends iteration.
pub struct ActionLogReader<R> {
    reader: R,
    offset: u64,
    done: bool,
}

impl ActionLogReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> ActionLogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            done: false,
        }
    }

    /// Fills `buf`, returning how many bytes were read before EOF.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn read_record(&mut self) -> Result<Option<ActionLogRecord>> {
        let offset = self.offset;
        let mut len_bytes = [0u8; LEN_PREFIX];
        let read = self.read_full(&mut len_bytes)?;
        if read == 0 {
            return Ok(None);
        }
        if read < LEN_PREFIX {
            return Err(RepositoryError::Truncated {
                offset,
                expected: LEN_PREFIX,
                actual: read,
            });
        }

        let len = u32::from_le_bytes(len_bytes);
        if len > MAX_RECORD_LEN {
            return Err(RepositoryError::RecordTooLarge {
                offset,
                len,
                max: MAX_RECORD_LEN,
            });
        }

        let mut data = vec![0u8; len as usize];
        let read = self.read_full(&mut data)?;
        if read < data.len() {
            return Err(RepositoryError::Truncated {
                offset,
                expected: LEN_PREFIX + data.len(),
                actual: LEN_PREFIX + read,
            });
        }

        let record: ActionLogRecord = bincode::deserialize(&data)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.offset += (LEN_PREFIX + data.len()) as u64;
        Ok(Some(record))
    }
}

impl<R: Read> Iterator for ActionLogReader<R> {
    type Item = Result<ActionLogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
