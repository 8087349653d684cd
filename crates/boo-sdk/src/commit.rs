use boo_diff::ChangeSet;
use boo_types::{FingerprintMap, SnapshotId};
use serde::{Deserialize, Serialize};

/// Result of a commit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub id: SnapshotId,
    pub message: String,
    /// The fingerprint map recorded for the snapshot.
    pub files: FingerprintMap,
}

/// Result of a reset: the new head and the paths rewritten to reach it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResetReport {
    pub id: SnapshotId,
    pub changes: ChangeSet,
}
