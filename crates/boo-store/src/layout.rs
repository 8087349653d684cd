use std::path::{Path, PathBuf};

use boo_types::SnapshotId;

/// Name of the reserved metadata directory at the repository root.
pub const BOO_DIR: &str = ".boo";

const LOG_FILE: &str = "log";
const HEAD_FILE: &str = "head";
const META_PREFIX: &str = "meta";
const CONFIG_FILE: &str = "config.toml";
const STAGING_PREFIX: &str = ".staging-";

/// Resolves every path under `.boo` for one repository root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    boo_dir: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let boo_dir = root.join(BOO_DIR);
        Self { root, boo_dir }
    }

    /// The working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.boo` directory.
    pub fn boo_dir(&self) -> &Path {
        &self.boo_dir
    }

    pub fn journal_path(&self) -> PathBuf {
        self.boo_dir.join(LOG_FILE)
    }

    pub fn head_path(&self) -> PathBuf {
        self.boo_dir.join(HEAD_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.boo_dir.join(CONFIG_FILE)
    }

    /// `meta<id>`.
    pub fn metadata_path(&self, id: &SnapshotId) -> PathBuf {
        self.boo_dir.join(format!("{META_PREFIX}{id}"))
    }

    /// `<id>/`.
    pub fn snapshot_dir(&self, id: &SnapshotId) -> PathBuf {
        self.boo_dir.join(id.to_string())
    }

    /// Prefix for transient commit staging entries inside `.boo`.
    pub fn staging_prefix(&self) -> &'static str {
        STAGING_PREFIX
    }
}
