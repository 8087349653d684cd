use std::fmt;

use boo_types::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::legacy::LegacySha;

/// A running content digest.
///
/// `update` may be called any number of times; `digest` reports the
/// fingerprint of everything folded in so far without consuming the state.
pub trait Fingerprinter: Send {
    /// Fold more bytes into the running state.
    fn update(&mut self, data: &[u8]);

    /// The fingerprint of all bytes folded in so far.
    fn digest(&self) -> Fingerprint;
}

/// Which digest a repository uses for file and tree fingerprints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// 256-bit BLAKE3.
    #[default]
    Blake3,
    /// 64-bit packed SHA-1 variant of the original tool.
    Legacy,
}

impl FingerprintAlgorithm {
    /// A fresh fingerprinter for this algorithm.
    pub fn hasher(&self) -> Box<dyn Fingerprinter> {
        match self {
            Self::Blake3 => Box::new(Blake3Fingerprinter::new()),
            Self::Legacy => Box::new(LegacySha::new()),
        }
    }

    /// Fingerprint a byte slice in one shot.
    pub fn fingerprint(&self, data: &[u8]) -> Fingerprint {
        match self {
            Self::Blake3 => Fingerprint::Blake3(*blake3::hash(data).as_bytes()),
            Self::Legacy => {
                let mut sha = LegacySha::new();
                sha.update(data);
                sha.digest()
            }
        }
    }

    /// Returns `true` if `fp` has the width this algorithm produces.
    pub fn produces(&self, fp: &Fingerprint) -> bool {
        matches!(
            (self, fp),
            (Self::Blake3, Fingerprint::Blake3(_)) | (Self::Legacy, Fingerprint::Legacy(_))
        )
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// BLAKE3 behind the [`Fingerprinter`] interface.
#[derive(Clone, Default)]
pub struct Blake3Fingerprinter {
    inner: blake3::Hasher,
}

impl Blake3Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fingerprinter for Blake3Fingerprinter {
    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn digest(&self) -> Fingerprint {
        Fingerprint::from(*self.inner.finalize().as_bytes())
    }
}
