//! Map-level diff: compare two fingerprint maps and produce a change set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use boo_types::FingerprintMap;
use serde::{Deserialize, Serialize};

/// The kind of change a path underwent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// The result of comparing two fingerprint maps.
///
/// The three sets are disjoint. Paths present in both maps with equal
/// fingerprints appear in none of them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// In `to` but not in `from`.
    pub added: BTreeSet<PathBuf>,
    /// In both, with different fingerprints.
    pub modified: BTreeSet<PathBuf>,
    /// In `from` but not in `to`.
    pub removed: BTreeSet<PathBuf>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Number of changed paths.
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Every changed path with its kind, sorted by path.
    pub fn entries(&self) -> Vec<(&Path, ChangeKind)> {
        let mut all: Vec<(&Path, ChangeKind)> = self
            .added
            .iter()
            .map(|p| (p.as_path(), ChangeKind::Added))
            .chain(self.modified.iter().map(|p| (p.as_path(), ChangeKind::Modified)))
            .chain(self.removed.iter().map(|p| (p.as_path(), ChangeKind::Removed)))
            .collect();
        all.sort();
        all
    }

    /// Union of the three sets.
    pub fn paths(&self) -> BTreeSet<&Path> {
        self.added
            .iter()
            .chain(&self.modified)
            .chain(&self.removed)
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Compare `from` against `to`.
pub fn diff(from: &FingerprintMap, to: &FingerprintMap) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (path, old) in from {
        match to.get(path) {
            Some(new) if new != old => {
                changes.modified.insert(path.clone());
            }
            Some(_) => {}
            None => {
                changes.removed.insert(path.clone());
            }
        }
    }

    for path in to.keys() {
        if !from.contains_key(path) {
            changes.added.insert(path.clone());
        }
    }

    changes
}
