use hbx_types::BlockId;

/// Errors from exchange operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// No peer could supply the requested block.
    #[error("block not available from any peer: {0}")]
    NotFound(BlockId),

    /// The exchange has been shut down; announces and fetches fail.
    #[error("exchange is closed")]
    Closed,

    /// Any other transport-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
