//! Local block storage for the HBX block service.
//!
//! The store is the authoritative holder of blocks this node possesses. It
//! is a dumb content-addressed byte store: keys are public-form identifiers,
//! values are storage-safe payloads, and the only interpretation the store
//! performs is verifying on put that a payload actually hashes to its
//! identifier's digest.
//!
//! # Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. Writes verify the digest before anything is stored.
//! 3. Concurrent reads are always safe (blocks are immutable).
//! 4. Not-found is a distinguishable condition, not a generic error.
//! 5. The store never sees key material; confidential payloads arrive sealed.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
