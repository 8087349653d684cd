//! Content fingerprinting for boo.
//!
//! Provides the [`Fingerprinter`] trait with two implementations: BLAKE3
//! (default for new repositories) and the legacy 64-bit SHA-1 variant kept for
//! repositories written by the original tool. [`TreeHasher`] folds per-file
//! fingerprints into a snapshot id.
//!
//! None of this is tamper-proofing. Fingerprints detect change; they do not
//! authenticate content.

pub mod hasher;
pub mod legacy;
pub mod tree;

pub use hasher::{Blake3Fingerprinter, FingerprintAlgorithm, Fingerprinter};
pub use legacy::LegacySha;
pub use tree::TreeHasher;
