use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or appending to the journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// I/O error on the journal file.
    #[error("journal I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A complete record could not be decoded.
    #[error("corrupt journal record at byte {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },
}

/// Convenience type alias for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
