use std::path::Path;

use boo_crypto::FingerprintAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::fs::atomic_write;

/// Per-repository configuration, stored as `.boo/config.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Digest used for file and snapshot fingerprints.
    pub fingerprint: FingerprintAlgorithm,
    /// `fsync` journal appends, metadata, and head writes.
    pub sync_writes: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintAlgorithm::Blake3,
            sync_writes: false,
        }
    }
}

impl RepoConfig {
    /// Configuration implied for repositories written by the original tool,
    /// which carry no `config.toml`.
    pub fn legacy() -> Self {
        Self {
            fingerprint: FingerprintAlgorithm::Legacy,
            ..Default::default()
        }
    }

    /// Load from `path`, falling back to [`RepoConfig::legacy`] when absent.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::legacy()),
            Err(e) => return Err(StoreError::io(path)(e)),
        };
        toml::from_str(&text)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let text = toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))?;
        atomic_write(path, text.as_bytes(), self.sync_writes)
    }
}
