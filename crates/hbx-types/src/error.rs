use thiserror::Error;

use hbx_crypto::{DigestError, SealError};

/// Errors produced by identifier and block operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("identifier truncated: need at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unknown codec code: 0x{0:02x}")]
    UnknownCodec(u8),

    #[error("digest length {actual} inconsistent with declared algorithm (expected {expected})")]
    DigestLength { expected: usize, actual: usize },

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Seal(#[from] SealError),
}
