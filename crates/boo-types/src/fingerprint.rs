use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content identifier for a file or a whole-tree snapshot.
///
/// Two widths exist. Repositories created by boo itself use [`Fingerprint::Blake3`];
/// repositories written by the original tool carry the 64-bit
/// [`Fingerprint::Legacy`] digest. The string form is what lands on disk: lowercase
/// hex for BLAKE3, decimal for legacy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Fingerprint {
    /// 256-bit BLAKE3 digest.
    Blake3([u8; 32]),
    /// 64-bit packed digest of the legacy SHA-1 variant.
    Legacy(u64),
}

/// Identifier of a committed snapshot. Snapshot ids are tree fingerprints.
pub type SnapshotId = Fingerprint;

/// Absolute file path to fingerprint, iterated in path order.
pub type FingerprintMap = BTreeMap<PathBuf, Fingerprint>;

impl Fingerprint {
    /// Hex-encoded BLAKE3 length in characters.
    pub const BLAKE3_HEX_LEN: usize = 64;

    /// Short representation for display (first 8 characters of the string form).
    pub fn short(&self) -> String {
        let full = self.to_string();
        full.chars().take(8).collect()
    }

    /// Returns `true` for the legacy 64-bit digest.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3(_) => write!(f, "Fingerprint({})", self.short()),
            Self::Legacy(v) => write!(f, "Fingerprint(legacy:{v})"),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3(bytes) => write!(f, "{}", hex::encode(bytes)),
            Self::Legacy(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Fingerprint {
    type Err = TypeError;

    /// Parse a string form: 64 hex characters is BLAKE3, otherwise a decimal `u64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == Self::BLAKE3_HEX_LEN {
            let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&bytes);
            return Ok(Self::Blake3(arr));
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidFingerprint(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self::Legacy)
            .map_err(|_| TypeError::InvalidFingerprint(s.to_string()))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self::Blake3(bytes)
    }
}
