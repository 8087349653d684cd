use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid fingerprint: {0:?}")]
    InvalidFingerprint(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}
