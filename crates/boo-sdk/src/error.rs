use std::path::PathBuf;

use boo_diff::ChangeSet;
use boo_store::StoreError;
use boo_types::SnapshotId;
use thiserror::Error;

/// Errors returned by [`crate::SnapshotManager`].
#[derive(Debug, Error)]
pub enum SdkError {
    /// No `.boo` directory in the start directory or any ancestor.
    #[error("not a boo repository (or any parent up to /): {}", .0.display())]
    NotARepository(PathBuf),

    /// `.boo` already exists where a repository was to be created.
    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// No snapshot directory exists for the id.
    #[error("commit not found: {0}")]
    CommitNotFound(SnapshotId),

    /// The text names no journaled commit.
    #[error("unknown commit: {0}")]
    UnknownCommit(String),

    /// The prefix matches more than one journaled commit.
    #[error("ambiguous commit prefix {prefix:?} matches {matches} commits")]
    AmbiguousCommit { prefix: String, matches: usize },

    /// The working tree differs from head and the reset was not forced.
    #[error("working tree has {} uncommitted change(s); use force to discard them", changes.len())]
    DirtyWorkingTree { changes: ChangeSet },

    /// A commit produced an id whose snapshot directory already exists.
    #[error("snapshot {0} already exists")]
    SnapshotExists(SnapshotId),

    /// I/O error at the filesystem boundary.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other repository store failure.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Reading or appending to the commit journal failed.
    #[error("journal error: {0}")]
    Journal(#[from] boo_journal::JournalError),
}

impl From<StoreError> for SdkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotARepository { start } => Self::NotARepository(start),
            StoreError::AlreadyInitialized(path) => Self::AlreadyInitialized(path),
            StoreError::Io { path, source } => Self::Io { path, source },
            other => Self::Store(other),
        }
    }
}

/// Result alias for snapshot operations.
pub type SdkResult<T> = Result<T, SdkError>;
