//! Working directory status relative to head.

use boo_types::SnapshotId;
use serde::{Deserialize, Serialize};

use crate::change_set::ChangeSet;

/// Changes in the working tree since the snapshot at head.
///
/// Without a head every file counts as added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdirStatus {
    pub head: Option<SnapshotId>,
    pub changes: ChangeSet,
}

impl WorkdirStatus {
    pub fn new(head: Option<SnapshotId>, changes: ChangeSet) -> Self {
        Self { head, changes }
    }

    /// Returns `true` if the working tree matches head.
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }
}
