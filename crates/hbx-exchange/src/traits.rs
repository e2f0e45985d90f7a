use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use hbx_types::{BlockId, PublicBlock};

use crate::error::ExchangeResult;

/// Read side of the exchange: fetch blocks from peers.
///
/// Both the service facade and per-request sessions resolve remote misses
/// through this trait; a session-scoped fetcher narrows want-list
/// bookkeeping to one logical request sequence.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single block by its public-form identifier.
    ///
    /// Cancellation is by dropping the future.
    async fn fetch_one(&self, id: &BlockId) -> ExchangeResult<PublicBlock>;

    /// Submit a batch of wants; hits stream back in no particular order.
    ///
    /// Best-effort: the channel may close before every want is satisfied,
    /// and duplicates or omissions are allowed. Receivers must compare
    /// delivered keys against the requested set to judge completeness.
    async fn fetch_many(&self, ids: Vec<BlockId>) -> ExchangeResult<mpsc::Receiver<PublicBlock>>;
}

/// Full exchange surface: fetching plus announcement and shutdown.
#[async_trait]
pub trait Exchange: Fetcher {
    /// Tell peers this node now holds `block`.
    ///
    /// Fails with [`ExchangeError::Closed`](crate::ExchangeError::Closed)
    /// once the exchange has shut down.
    async fn announce(&self, block: &PublicBlock) -> ExchangeResult<()>;

    /// Release exchange resources. Announces after this fail.
    async fn close(&self) -> ExchangeResult<()>;

    /// Capability probe: exchanges that can scope want-list bookkeeping to a
    /// request sequence return themselves here. The default says no.
    fn as_session_exchange(&self) -> Option<&dyn SessionExchange> {
        None
    }
}

/// Exchanges that support request-scoped sessions.
pub trait SessionExchange: Exchange {
    /// Open a fetcher whose bookkeeping is scoped to one request sequence.
    fn new_session(&self) -> Arc<dyn Fetcher>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimalExchange;

    #[async_trait]
    impl Fetcher for MinimalExchange {
        async fn fetch_one(&self, id: &BlockId) -> ExchangeResult<PublicBlock> {
            Err(crate::ExchangeError::NotFound(id.public_form()))
        }

        async fn fetch_many(
            &self,
            _ids: Vec<BlockId>,
        ) -> ExchangeResult<mpsc::Receiver<PublicBlock>> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }
    }

    #[async_trait]
    impl Exchange for MinimalExchange {
        async fn announce(&self, _block: &PublicBlock) -> ExchangeResult<()> {
            Ok(())
        }

        async fn close(&self) -> ExchangeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn sessions_are_opt_in() {
        let exchange = MinimalExchange;
        assert!(exchange.as_session_exchange().is_none());
    }
}
