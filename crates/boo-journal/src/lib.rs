//! Append-only commit journal for boo.
//!
//! One record per commit, oldest first. The journal is never rewritten or
//! truncated; history display reads it front to back.

pub mod error;
pub mod journal;

pub use error::{JournalError, Result};
pub use journal::{CommitJournal, JournalEntry};
