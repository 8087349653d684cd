use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use boo_types::SnapshotId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{JournalError, Result};

const SEPARATOR: &[u8] = b"\n\n";

/// One journal record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: SnapshotId,
    pub message: String,
}

impl JournalEntry {
    pub fn new(id: SnapshotId, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}

/// The commit journal file.
///
/// On-disk format, one record per commit:
/// ```text
/// <id>\n
/// <message length in bytes>\n
/// <message bytes>\n
/// \n
/// ```
/// The length prefix, not a delimiter scan, bounds the message, so messages
/// may contain newlines.
#[derive(Clone, Debug)]
pub struct CommitJournal {
    path: PathBuf,
    sync: bool,
}

impl CommitJournal {
    /// A journal backed by `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync: false,
        }
    }

    /// `fsync` after every append.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record. The file is flushed and closed before returning, so a
    /// following [`CommitJournal::parse_all`] sees it.
    ///
    /// A torn trailing record left by an interrupted append is cut off first,
    /// so the new record starts on a record boundary.
    pub fn append(&self, id: &SnapshotId, message: &str) -> Result<()> {
        let io = |source| JournalError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(io)?;
        let mut existing = Vec::new();
        file.read_to_end(&mut existing).map_err(io)?;
        let (_, end) = decode(&existing)?;
        if end < existing.len() {
            warn!(
                offset = end,
                dropped = existing.len() - end,
                "discarding torn journal tail"
            );
            file.set_len(end as u64).map_err(io)?;
        }

        let mut w = BufWriter::new(file);
        write!(w, "{id}\n{}\n", message.len()).map_err(io)?;
        w.write_all(message.as_bytes()).map_err(io)?;
        w.write_all(SEPARATOR).map_err(io)?;
        w.flush().map_err(io)?;
        if self.sync {
            w.get_ref().sync_all().map_err(io)?;
        }

        debug!(%id, len = message.len(), "journal append");
        Ok(())
    }

    /// Every record in file order (oldest first).
    ///
    /// A missing file is an empty journal. A trailing record cut short by the
    /// end of the file ends the scan without error.
    pub fn parse_all(&self) -> Result<Vec<JournalEntry>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(JournalError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let (entries, _) = decode(&data)?;
        debug!(records = entries.len(), "journal read");
        Ok(entries)
    }
}

/// Decode every complete record. Also returns the offset just past the last
/// one, where the next append belongs.
fn decode(data: &[u8]) -> Result<(Vec<JournalEntry>, usize)> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let record_start = offset;
        let corrupt = |reason: String| JournalError::Corrupt {
            offset: record_start,
            reason,
        };

        let Some((id_line, next)) = read_line(data, offset) else {
            break;
        };
        if id_line.is_empty() {
            if data[next..].iter().all(u8::is_ascii_whitespace) {
                break;
            }
            return Err(corrupt("empty id line".into()));
        }
        let Some((len_line, next)) = read_line(data, next) else {
            break;
        };

        let id: SnapshotId = std::str::from_utf8(id_line)
            .map_err(|e| corrupt(e.to_string()))?
            .parse()
            .map_err(|e| corrupt(format!("{e}")))?;
        let len: usize = std::str::from_utf8(len_line)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| corrupt(format!("invalid message length {:?}", String::from_utf8_lossy(len_line))))?;

        let message_end = next.saturating_add(len);
        let record_end = message_end.saturating_add(SEPARATOR.len());
        if record_end > data.len() {
            warn!(offset = record_start, "truncated journal record; stopping");
            break;
        }
        if &data[message_end..record_end] != SEPARATOR {
            return Err(corrupt("message not followed by a blank line".into()));
        }

        let message = String::from_utf8_lossy(&data[next..message_end]).into_owned();
        entries.push(JournalEntry { id, message });
        offset = record_end;
    }

    Ok((entries, offset))
}

/// The bytes of the line starting at `start` and the offset just past its
/// newline, or `None` if no newline follows.
fn read_line(data: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let rel = data[start..].iter().position(|&b| b == b'\n')?;
    Some((&data[start..start + rel], start + rel + 1))
}
