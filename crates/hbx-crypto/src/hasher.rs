use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest;

/// Hash algorithm declared by a content identifier.
///
/// Wire codes follow the multihash registry, so an identifier stays
/// self-describing when it crosses a process boundary. The legacy entries
/// (SHA-1, MD5) exist so identifiers minted elsewhere can be decoded and then
/// refused by policy; [`digest`] will not produce them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlg {
    /// SHA-1 (legacy, decode-only).
    Sha1,
    /// SHA2-256.
    Sha2_256,
    /// SHA2-512.
    Sha2_512,
    /// BLAKE3.
    Blake3,
    /// MD5 (legacy, decode-only).
    Md5,
}

impl HashAlg {
    /// Multihash wire code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Sha1 => 0x11,
            Self::Sha2_256 => 0x12,
            Self::Sha2_512 => 0x13,
            Self::Blake3 => 0x1e,
            Self::Md5 => 0xd5,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Result<Self, DigestError> {
        match code {
            0x11 => Ok(Self::Sha1),
            0x12 => Ok(Self::Sha2_256),
            0x13 => Ok(Self::Sha2_512),
            0x1e => Ok(Self::Blake3),
            0xd5 => Ok(Self::Md5),
            other => Err(DigestError::UnknownCode(other)),
        }
    }

    /// Digest length in bytes produced by this algorithm.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha2_256 => 32,
            Self::Sha2_512 => 64,
            Self::Blake3 => 32,
            Self::Md5 => 16,
        }
    }

    /// Whether this crate will compute digests with this algorithm.
    pub const fn is_producible(&self) -> bool {
        matches!(self, Self::Sha2_256 | Self::Sha2_512 | Self::Blake3)
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sha1 => "sha1",
            Self::Sha2_256 => "sha2-256",
            Self::Sha2_512 => "sha2-512",
            Self::Blake3 => "blake3",
            Self::Md5 => "md5",
        };
        write!(f, "{s}")
    }
}

/// Errors from digest computation and algorithm decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    /// The algorithm is decode-only; this crate refuses to produce it.
    #[error("refusing to compute {0} digest (legacy algorithm)")]
    LegacyAlgorithm(HashAlg),

    /// Unknown multihash wire code.
    #[error("unknown hash algorithm code: 0x{0:02x}")]
    UnknownCode(u8),
}

/// Compute the digest of `data` under `alg`.
///
/// Fails for legacy algorithms; callers that merely hold a foreign digest
/// never call this.
pub fn digest(alg: HashAlg, data: &[u8]) -> Result<Vec<u8>, DigestError> {
    match alg {
        HashAlg::Sha2_256 => Ok(sha2::Sha256::digest(data).to_vec()),
        HashAlg::Sha2_512 => Ok(sha2::Sha512::digest(data).to_vec()),
        HashAlg::Blake3 => Ok(blake3::hash(data).as_bytes().to_vec()),
        HashAlg::Sha1 | HashAlg::Md5 => Err(DigestError::LegacyAlgorithm(alg)),
    }
}

/// Verify that `data` hashes to `expected` under `alg`.
///
/// Legacy algorithms always fail verification: a digest this crate cannot
/// recompute cannot be trusted.
pub fn verify(alg: HashAlg, data: &[u8], expected: &[u8]) -> bool {
    match digest(alg, data) {
        Ok(computed) => computed == expected,
        Err(_) => false,
    }
}
