use hbx_types::BlockId;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block is not held locally.
    #[error("block not found in local store: {0}")]
    NotFound(BlockId),

    /// Payload does not hash to the identifier's digest (corruption or a
    /// forged identifier).
    #[error("digest mismatch for {id}: payload does not hash to its identifier")]
    DigestMismatch { id: BlockId },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error is the distinguishable not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
