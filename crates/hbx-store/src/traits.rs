use hbx_types::{BlockId, PublicBlock};

use crate::error::StoreResult;

/// Content-addressed local block store.
///
/// All implementations must satisfy these invariants:
/// - Keys are public-form identifiers; the store never receives key material.
/// - Blocks are immutable once written; writing the same block again is a
///   no-op (content-addressing makes writes idempotent).
/// - `put` verifies that the payload hashes to the identifier's digest and
///   refuses the write otherwise.
/// - `get` on an absent key reports [`StoreError::NotFound`](crate::StoreError::NotFound),
///   distinguishable from every other failure.
/// - Implementations are safe for concurrent use by multiple callers.
pub trait BlockStore: Send + Sync {
    /// Whether a block for `id` is held locally.
    fn has(&self, id: &BlockId) -> StoreResult<bool>;

    /// Read the block addressed by `id`.
    fn get(&self, id: &BlockId) -> StoreResult<PublicBlock>;

    /// Write one block, verifying its digest first.
    fn put(&self, block: &PublicBlock) -> StoreResult<()>;

    /// Write a batch of blocks.
    ///
    /// Default implementation calls `put()` for each block. Backends may
    /// override for better performance (e.g., a single fsync).
    fn put_many(&self, blocks: &[PublicBlock]) -> StoreResult<()> {
        blocks.iter().try_for_each(|block| self.put(block))
    }

    /// Remove the block addressed by `id`. Returns `true` if it existed.
    fn delete(&self, id: &BlockId) -> StoreResult<bool>;
}
