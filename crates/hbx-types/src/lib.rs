//! Core data model for the HBX block service.
//!
//! Everything in HBX is addressed by a [`BlockId`]: a self-describing
//! content identifier carrying the hash algorithm, a content-encoding tag,
//! and the digest of the block's stored bytes. An identifier may privately
//! carry an AEAD key for confidential payloads; that key is excluded from
//! equality, encoding, and serialization, so the [`public form`](BlockId::public_form)
//! is the only thing the store and the network ever see.
//!
//! Three block views exist:
//!
//! - [`Block`] -- what callers construct: identifier plus payload, where a
//!   confidential payload is already sealed and its key rides in the id.
//! - [`PublicBlock`] -- the storage/exchange projection: public-form id,
//!   storage-safe bytes.
//! - [`DecryptedBlock`] -- the read-side projection handed back to callers:
//!   original id, plaintext bytes.
//!
//! Blocks are immutable values; the hash invariant (payload hashes to the
//! identifier's digest) is enforced where blocks enter a store, not here.

pub mod block;
pub mod error;
pub mod id;

pub use block::{Block, DecryptedBlock, PublicBlock};
pub use error::TypeError;
pub use id::{BlockId, Codec};

// Re-exported so downstream crates name one source for identifier vocabulary.
pub use hbx_crypto::{HashAlg, SecretKey};
