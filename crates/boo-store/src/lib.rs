//! Repository store for boo.
//!
//! Finds the repository that owns a working directory, owns every path under
//! the reserved `.boo` directory, and computes the working tree's current
//! fingerprint map.
//!
//! # On-disk layout
//!
//! ```text
//! .boo/
//!   config.toml     repository configuration (absent in legacy repositories)
//!   log             commit journal
//!   head            id of the current snapshot
//!   meta<id>        path/fingerprint records of snapshot <id>
//!   <id>/           full copy of the working tree at snapshot <id>
//! ```
//!
//! # Design Rules
//!
//! 1. Snapshots are immutable once published. Nothing here rewrites `meta<id>`
//!    or `<id>/`.
//! 2. Small files (`head`, `meta<id>`) are written to a temp file and renamed.
//! 3. There is no locking. Two processes mutating one repository may interleave.

pub mod config;
pub mod error;
pub mod fs;
pub mod layout;
pub mod metadata;
pub mod repository;

pub use config::RepoConfig;
pub use error::{StoreError, StoreResult};
pub use layout::{Layout, BOO_DIR};
pub use repository::{RepositoryStore, WorkingTree};
