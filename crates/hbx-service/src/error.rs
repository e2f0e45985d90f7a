use thiserror::Error;

use hbx_crypto::SealError;
use hbx_exchange::ExchangeError;
use hbx_gate::AdmissibilityError;
use hbx_store::StoreError;
use hbx_types::{BlockId, TypeError};

/// Errors surfaced by block service operations.
///
/// Validation and not-found conditions resolve into their own variants;
/// transport and store failures pass through untouched. Nothing here is
/// retried internally -- retry policy belongs to the exchange or the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The identifier failed the admissibility gate; fix the identifier.
    #[error("inadmissible identifier: {0}")]
    Admissibility(#[from] AdmissibilityError),

    /// Neither the local store nor the exchange (if any) holds the block.
    #[error("block not found: {0}")]
    NotFound(BlockId),

    /// Fetched bytes could not be reconstituted into plaintext.
    #[error("decryption failed: {0}")]
    Decryption(SealError),

    /// The write persisted locally but the announcement failed because the
    /// exchange has shut down. The local write is not rolled back.
    #[error("block service is closed")]
    Closed,

    /// Any other exchange-originated failure.
    #[error("exchange error: {0}")]
    Exchange(ExchangeError),

    /// Local store failure other than not-found.
    #[error("store error: {0}")]
    Store(StoreError),

    /// The block or identifier itself is malformed.
    #[error("malformed block: {0}")]
    Malformed(TypeError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<ExchangeError> for ServiceError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::NotFound(id) => Self::NotFound(id),
            ExchangeError::Closed => Self::Closed,
            other => Self::Exchange(other),
        }
    }
}

impl From<TypeError> for ServiceError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::Seal(seal) => Self::Decryption(seal),
            other => Self::Malformed(other),
        }
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
