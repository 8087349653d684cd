use std::path::{Path, PathBuf};

use boo_types::TypeError;

/// Errors from repository store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No `.boo` directory in the start directory or any ancestor.
    #[error("not a boo repository (or any parent up to /): {}", start.display())]
    NotARepository { start: PathBuf },

    /// `.boo` already exists where a repository was to be created.
    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// I/O error at the filesystem boundary.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the working tree failed.
    #[error("failed to walk working tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// A metadata file could not be parsed.
    #[error("corrupt metadata {} at line {line}: {reason}", path.display())]
    CorruptMetadata {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// `config.toml` could not be read or written.
    #[error("config error: {0}")]
    Config(String),

    /// A path lies outside the repository root.
    #[error("path is outside the repository: {}", .0.display())]
    OutsideRepository(PathBuf),

    /// A stored id could not be parsed.
    #[error("invalid id: {0}")]
    InvalidId(#[from] TypeError),
}

impl StoreError {
    /// Adapter for `map_err` that attaches the path to an I/O error.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
