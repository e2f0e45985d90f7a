use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tracing::trace;

use hbx_types::{BlockId, PublicBlock};

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Payloads are held behind a `RwLock`;
/// `Bytes` makes reads cheap (reference-counted, no copy).
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<BlockId, Bytes>>,
}

impl InMemoryBlockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently held.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all held blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Remove every block.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn has(&self, id: &BlockId) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn get(&self, id: &BlockId) -> StoreResult<PublicBlock> {
        let map = self.blocks.read().expect("lock poisoned");
        match map.get(id) {
            Some(data) => Ok(PublicBlock::new(id.clone(), data.clone())),
            None => Err(StoreError::NotFound(id.public_form())),
        }
    }

    fn put(&self, block: &PublicBlock) -> StoreResult<()> {
        if !hbx_crypto::verify(block.id().alg(), block.data(), block.id().digest()) {
            return Err(StoreError::DigestMismatch {
                id: block.id().clone(),
            });
        }
        let mut map = self.blocks.write().expect("lock poisoned");
        // Idempotent: same ID always maps to the same content.
        map.entry(block.id().clone())
            .or_insert_with(|| block.data().clone());
        trace!(id = %block.id(), "block stored");
        Ok(())
    }

    fn put_many(&self, blocks: &[PublicBlock]) -> StoreResult<()> {
        // Verify everything before touching the map so a bad block cannot
        // leave a partial batch behind.
        for block in blocks {
            if !hbx_crypto::verify(block.id().alg(), block.data(), block.id().digest()) {
                return Err(StoreError::DigestMismatch {
                    id: block.id().clone(),
                });
            }
        }
        let mut map = self.blocks.write().expect("lock poisoned");
        for block in blocks {
            map.entry(block.id().clone())
                .or_insert_with(|| block.data().clone());
        }
        Ok(())
    }

    fn delete(&self, id: &BlockId) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbx_types::{Block, Codec, HashAlg, SecretKey};

    fn public(data: &[u8]) -> PublicBlock {
        Block::new(HashAlg::Blake3, Codec::Raw, data.to_vec())
            .unwrap()
            .to_public()
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryBlockStore::new();
        let block = public(b"hello world");
        store.put(&block).unwrap();

        let read_back = store.get(block.id()).unwrap();
        assert_eq!(read_back, block);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryBlockStore::new();
        let block = public(b"never stored");
        let err = store.get(block.id()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn has_reflects_contents() {
        let store = InMemoryBlockStore::new();
        let block = public(b"present");
        assert!(!store.has(block.id()).unwrap());
        store.put(&block).unwrap();
        assert!(store.has(block.id()).unwrap());
    }

    #[test]
    fn delete_returns_whether_present() {
        let store = InMemoryBlockStore::new();
        let block = public(b"to-delete");
        store.put(&block).unwrap();
        assert!(store.delete(block.id()).unwrap());
        assert!(!store.has(block.id()).unwrap());
        assert!(!store.delete(block.id()).unwrap());
    }

    // -----------------------------------------------------------------------
    // Digest verification
    // -----------------------------------------------------------------------

    #[test]
    fn put_rejects_digest_mismatch() {
        let store = InMemoryBlockStore::new();
        let good = public(b"real content");
        let forged = PublicBlock::new(good.id().clone(), &b"other content"[..]);
        let err = store.put(&forged).unwrap_err();
        assert!(matches!(err, StoreError::DigestMismatch { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn put_accepts_sealed_payloads() {
        // The store sees only ciphertext; the digest covers the ciphertext.
        let store = InMemoryBlockStore::new();
        let sealed = Block::seal(HashAlg::Blake3, Codec::Raw, b"secret", SecretKey::generate())
            .unwrap()
            .to_public()
            .unwrap();
        store.put(&sealed).unwrap();
        assert!(store.has(sealed.id()).unwrap());
    }

    #[test]
    fn put_many_verifies_before_writing() {
        let store = InMemoryBlockStore::new();
        let good = public(b"fine");
        let forged = PublicBlock::new(public(b"a").id().clone(), &b"b"[..]);
        assert!(store.put_many(&[good, forged]).is_err());
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Idempotency & batches
    // -----------------------------------------------------------------------

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryBlockStore::new();
        let block = public(b"idempotent");
        store.put(&block).unwrap();
        store.put(&block).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_many_stores_all() {
        let store = InMemoryBlockStore::new();
        let blocks = vec![public(b"batch-1"), public(b"batch-2"), public(b"batch-3")];
        store.put_many(&blocks).unwrap();
        assert_eq!(store.len(), 3);
        for block in &blocks {
            assert!(store.has(block.id()).unwrap());
        }
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_total_bytes_clear() {
        let store = InMemoryBlockStore::new();
        assert!(store.is_empty());
        store.put(&public(b"12345")).unwrap();
        store.put(&public(b"123456789")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_bytes(), 14);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryBlockStore::new());
        let block = public(b"shared data");
        store.put(&block).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = block.id().clone();
                thread::spawn(move || {
                    let read = store.get(&id).unwrap();
                    assert_eq!(read.id(), &id);
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlockStore::new();
        store.put(&public(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlockStore"));
        assert!(debug.contains("block_count"));
    }
}
