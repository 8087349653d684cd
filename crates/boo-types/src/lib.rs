//! Foundation types for boo.
//!
//! Every other boo crate depends on `boo-types`.
//!
//! # Key Types
//!
//! - [`Fingerprint`]: Content identifier (BLAKE3 or the legacy 64-bit digest)
//! - [`SnapshotId`]: Identifier of a committed snapshot
//! - [`FingerprintMap`]: Ordered map from absolute path to fingerprint

pub mod error;
pub mod fingerprint;

pub use error::TypeError;
pub use fingerprint::{Fingerprint, FingerprintMap, SnapshotId};
