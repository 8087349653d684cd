//! Snapshot manager for boo.
//!
//! [`SnapshotManager`] is the entry point for applications embedding boo. It
//! records snapshots of a working tree and restores the tree to any of them.

pub mod commit;
pub mod error;
pub mod snapshot;

pub use commit::{CommitReceipt, ResetReport};
pub use error::{SdkError, SdkResult};
pub use snapshot::SnapshotManager;

// Re-export key types
pub use boo_crypto::FingerprintAlgorithm;
pub use boo_diff::{diff, ChangeKind, ChangeSet, WorkdirStatus};
pub use boo_journal::JournalEntry;
pub use boo_store::{RepoConfig, RepositoryStore, WorkingTree};
pub use boo_types::{Fingerprint, FingerprintMap, SnapshotId};
