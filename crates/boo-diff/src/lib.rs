//! Diff engine for boo.
//!
//! Compares two path→fingerprint maps and classifies every differing path as
//! added, modified, or removed.
//!
//! # Key Types
//!
//! - [`ChangeSet`] -- Disjoint added/modified/removed path sets
//! - [`WorkdirStatus`] -- Working tree changes relative to head

pub mod change_set;
pub mod status;

pub use change_set::{diff, ChangeKind, ChangeSet};
pub use status::WorkdirStatus;
