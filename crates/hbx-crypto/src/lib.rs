//! Cryptographic primitives for the HBX block service.
//!
//! Two concerns live here:
//!
//! - [`hasher`] -- the registry of hash algorithms an identifier may declare,
//!   and digest computation/verification for the algorithms this crate is
//!   willing to produce.
//! - [`seal`] -- AES-256-GCM sealing of confidential payloads. A sealed
//!   payload is stored and exchanged as opaque ciphertext; the key rides in
//!   the caller's identifier and never reaches the store or the network.
//!
//! Legacy algorithms (SHA-1, MD5) are representable so that identifiers
//! carrying them can be parsed and rejected by policy, but this crate refuses
//! to compute digests with them.

pub mod hasher;
pub mod seal;

pub use hasher::{digest, verify, DigestError, HashAlg};
pub use seal::{seal, unseal, SealError, SecretKey, NONCE_LEN};
