//! Append-only JSON-lines record log

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::StorageError;

/// A record paired with its identity key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub id: u64,
    #[serde(flatten)]
    pub record: T,
}

/// File operations the writer needs
trait LogFile: Write {
    fn size(&self) -> io::Result<u64>;

    fn truncate(&mut self, len: u64) -> io::Result<()>;

    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

struct LogWriter {
    file: File,
    next_id: u64,
}

/// One durable file of newline-delimited JSON records.
///
/// Ids are assigned under the writer lock, so ids in the file are strictly
/// increasing in append order. A failed append leaves the file as it was.
pub struct RecordLog {
    path: PathBuf,
    sync_on_write: bool,
    writer: Mutex<LogWriter>,
}

impl RecordLog {
    /// Open (or create) the log at `path` and replay its contents
    pub fn open<T: DeserializeOwned>(
        path: impl AsRef<Path>,
        sync_on_write: bool,
    ) -> Result<(Self, Vec<Entry<T>>), StorageError> {
        let path = path.as_ref().to_path_buf();

        let contents = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let replay = parse_entries::<T>(&path, &contents)?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        if replay.valid_len < contents.len() {
            tracing::warn!(
                file = %path.display(),
                dropped_bytes = contents.len() - replay.valid_len,
                "Discarding torn record at end of log"
            );
            file.set_len(replay.valid_len as u64)?;
        }

        // Complete record missing its newline; terminate it before appending
        if replay.missing_newline {
            append_line(&mut file, b"\n", sync_on_write)?;
        }

        let next_id = replay.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        let log = Self {
            path,
            sync_on_write,
            writer: Mutex::new(LogWriter { file, next_id }),
        };

        Ok((log, replay.entries))
    }

    /// Append a record, returning its assigned id
    pub fn append<T: Serialize>(&self, record: &T) -> Result<u64, StorageError> {
        let mut writer = self.writer.lock();
        let id = writer.next_id;

        let mut line = serde_json::to_vec(&Entry { id, record })
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push(b'\n');

        append_line(&mut writer.file, &line, self.sync_on_write)?;

        writer.next_id += 1;
        Ok(id)
    }

    /// Force buffered data to disk
    pub fn sync(&self) -> Result<(), StorageError> {
        self.writer.lock().file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `line` in full or not at all: on any failure, including a failed
/// sync, the file is cut back to its previous length.
fn append_line<F: LogFile>(file: &mut F, line: &[u8], sync: bool) -> io::Result<()> {
    let start = file.size()?;

    if let Err(e) = write_and_sync(file, line, sync) {
        if let Err(rollback) = file.truncate(start) {
            tracing::error!(error = %rollback, "Failed to roll back partial log write");
        }
        return Err(e);
    }

    Ok(())
}

fn write_and_sync<F: LogFile>(file: &mut F, line: &[u8], sync: bool) -> io::Result<()> {
    file.write_all(line)?;
    file.flush()?;
    if sync {
        file.sync()?;
    }
    Ok(())
}

struct Replay<T> {
    entries: Vec<Entry<T>>,
    /// Byte length of the prefix worth keeping
    valid_len: usize,
    /// The kept prefix ends in a complete record without its newline
    missing_newline: bool,
}

/// Parse the log line by line. An unparseable final segment without a
/// newline is a torn write and falls outside `valid_len`; an unparseable
/// line anywhere else is corruption.
fn parse_entries<T: DeserializeOwned>(
    path: &Path,
    contents: &[u8],
) -> Result<Replay<T>, StorageError> {
    let mut entries = Vec::new();
    let mut offset = 0;
    let mut missing_newline = false;

    for (idx, line) in contents.split_inclusive(|b| *b == b'\n').enumerate() {
        let terminated = line.ends_with(b"\n");

        if line.iter().all(u8::is_ascii_whitespace) {
            offset += line.len();
            continue;
        }

        match serde_json::from_slice::<Entry<T>>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) if !terminated => break,
            Err(e) => {
                return Err(StorageError::Corrupted {
                    file: path.display().to_string(),
                    line: idx + 1,
                    reason: e.to_string(),
                })
            }
        }

        offset += line.len();
        missing_newline = !terminated;
    }

    Ok(Replay {
        entries,
        valid_len: offset,
        missing_newline,
    })
}
