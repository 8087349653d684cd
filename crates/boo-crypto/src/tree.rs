//! Whole-tree fingerprint: folds `(relative path, fingerprint)` pairs in
//! sorted path order, then a nonce, into a snapshot id.

use std::path::{Component, Path};

use boo_types::Fingerprint;

use crate::hasher::{FingerprintAlgorithm, Fingerprinter};

const TREE_DOMAIN: &[u8] = b"boo-tree-v1:";

/// Accumulates a working tree into a single fingerprint.
///
/// Callers must add pairs in ascending path order; [`TreeHasher::from_pairs`]
/// does so for an ordered iterator. Paths are folded with `/` separators so
/// the same tree yields the same bytes on every platform.
pub struct TreeHasher {
    algorithm: FingerprintAlgorithm,
    inner: Box<dyn Fingerprinter>,
    entries: usize,
}

impl std::fmt::Debug for TreeHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeHasher")
            .field("algorithm", &self.algorithm)
            .field("entries", &self.entries)
            .finish()
    }
}

impl TreeHasher {
    pub fn new(algorithm: FingerprintAlgorithm) -> Self {
        let mut inner = algorithm.hasher();
        inner.update(TREE_DOMAIN);
        Self {
            algorithm,
            inner,
            entries: 0,
        }
    }

    /// Build from pairs already sorted by path.
    pub fn from_pairs<'a, I>(algorithm: FingerprintAlgorithm, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a Path, &'a Fingerprint)>,
    {
        let mut tree = Self::new(algorithm);
        for (path, fp) in pairs {
            tree.add(path, fp);
        }
        tree
    }

    /// Fold one file into the tree.
    pub fn add(&mut self, relative_path: &Path, fingerprint: &Fingerprint) {
        self.inner.update(portable_path(relative_path).as_bytes());
        self.inner.update(b"\0");
        self.inner.update(fingerprint.to_string().as_bytes());
        self.inner.update(b"\n");
        self.entries += 1;
    }

    /// Number of files folded in so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// Mix in `nonce` and produce the snapshot id.
    pub fn finish(mut self, nonce: &str) -> Fingerprint {
        self.inner.update(nonce.as_bytes());
        self.inner.digest()
    }
}

fn portable_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
