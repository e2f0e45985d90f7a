use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use hbx_exchange::{Exchange, Fetcher};
use hbx_store::BlockStore;
use hbx_types::{Block, BlockId, DecryptedBlock, PublicBlock};

use crate::config::{ServiceConfig, WriteMode};
use crate::error::{ServiceError, ServiceResult};
use crate::events::{BlockEvent, EventSink, NoopEvents};
use crate::resolve;
use crate::session::Session;

/// Hybrid block service: a unified get/put/delete surface over a local
/// store with transparent fallback to a peer exchange.
///
/// The service is a stateless coordinator; the store and exchange references
/// it holds are shared and internally safe for concurrent use, so any number
/// of simultaneous operations may run against one service. Check-first
/// existence checks race benignly with concurrent `put`s of the same
/// identifier: content addressing makes the duplicate write idempotent.
pub struct BlockService {
    store: Arc<dyn BlockStore>,
    exchange: Option<Arc<dyn Exchange>>,
    config: ServiceConfig,
    events: Arc<dyn EventSink>,
}

impl BlockService {
    /// Create a service in check-first mode with the default gate policy.
    ///
    /// Passing no exchange yields a local-only service: reads miss to
    /// `NotFound` instead of the network and writes skip announcement.
    pub fn new(store: Arc<dyn BlockStore>, exchange: Option<Arc<dyn Exchange>>) -> Self {
        Self::with_config(store, exchange, ServiceConfig::default())
    }

    /// Create a service that always writes and always announces, guaranteeing
    /// a `put` followed by a `get` observes the write.
    pub fn new_write_through(
        store: Arc<dyn BlockStore>,
        exchange: Option<Arc<dyn Exchange>>,
    ) -> Self {
        Self::with_config(
            store,
            exchange,
            ServiceConfig {
                write_mode: WriteMode::WriteThrough,
                ..ServiceConfig::default()
            },
        )
    }

    /// Create a service with explicit configuration.
    pub fn with_config(
        store: Arc<dyn BlockStore>,
        exchange: Option<Arc<dyn Exchange>>,
        config: ServiceConfig,
    ) -> Self {
        if exchange.is_none() {
            warn!("block service running in local (offline) mode");
        }
        Self {
            store,
            exchange,
            config,
            events: Arc::new(NoopEvents),
        }
    }

    /// Replace the event sink (default: discard).
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// The underlying local store.
    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// The underlying exchange, if one is configured.
    pub fn exchange(&self) -> Option<&Arc<dyn Exchange>> {
        self.exchange.as_ref()
    }

    /// Open a read-only session scoped to one logical request sequence.
    ///
    /// When the exchange supports sessions, fetches go through a
    /// session-scoped fetcher that narrows want-list bookkeeping; otherwise
    /// the raw exchange is shared. Independent sessions are concurrency-safe
    /// with no cross-session coordination.
    pub fn session(&self) -> Session {
        let fetcher = self.exchange.as_ref().map(|exchange| {
            match exchange.as_session_exchange() {
                Some(scoped) => scoped.new_session(),
                None => {
                    let shared: Arc<dyn Fetcher> = exchange.clone();
                    shared
                }
            }
        });
        Session::new(
            Arc::clone(&self.store),
            fetcher,
            self.config.gate.clone(),
            Arc::clone(&self.events),
        )
    }

    /// Get one block: local store first, exchange on a miss.
    ///
    /// A remote hit is returned to the caller without being written to the
    /// local store; callers that want a local copy `put` it explicitly.
    pub async fn get(&self, id: &BlockId) -> ServiceResult<DecryptedBlock> {
        let fetcher = self.exchange.as_deref().map(|e| e as &dyn Fetcher);
        resolve::get_block(
            self.store.as_ref(),
            fetcher,
            &self.config.gate,
            self.events.as_ref(),
            id,
        )
        .await
    }

    /// Get a batch of blocks as a stream, in no particular order.
    ///
    /// The stream closes when every resolvable key has been delivered, the
    /// exchange gives up, or the receiver is dropped; compare delivered keys
    /// against the requested set to judge completeness.
    ///
    /// Known inconsistency: per-key failures (inadmissible identifiers,
    /// undecryptable payloads) are dropped from the stream, while
    /// [`get`](Self::get) reports the same failures as errors. Callers that
    /// need the strict behavior should resolve keys individually.
    pub fn get_many(&self, ids: Vec<BlockId>) -> mpsc::Receiver<DecryptedBlock> {
        let fetcher = self.exchange.clone().map(|exchange| {
            let shared: Arc<dyn Fetcher> = exchange;
            shared
        });
        resolve::get_blocks(
            Arc::clone(&self.store),
            fetcher,
            self.config.gate.clone(),
            Arc::clone(&self.events),
            ids,
        )
    }

    /// Put one block: persist locally, then announce to the exchange.
    ///
    /// In check-first mode a block the store already holds is neither
    /// rewritten nor re-announced. An announcement failure is reported as
    /// [`ServiceError::Closed`] even though the local write already
    /// succeeded; the write is not rolled back.
    pub async fn put(&self, block: &Block) -> ServiceResult<()> {
        let public = block.to_public()?;
        self.config.gate.validate(public.id())?;

        if self.config.write_mode == WriteMode::CheckFirst && self.store.has(public.id())? {
            return Ok(());
        }

        self.store.put(&public)?;
        self.events.publish(BlockEvent::Added(public.id().clone()));
        debug!(id = %public.id(), "block added");
        self.announce(&public).await
    }

    /// Put a batch of blocks.
    ///
    /// Projection and gate checks run for every block up front; the first
    /// failure aborts the whole call with nothing persisted. The accepted
    /// set is persisted through one bulk store call; announcements then run
    /// per block, and the first announcement failure aborts the remainder --
    /// already-persisted blocks stay put.
    pub async fn put_many(&self, blocks: &[Block]) -> ServiceResult<()> {
        let mut publics = Vec::with_capacity(blocks.len());
        for block in blocks {
            let public = block.to_public()?;
            self.config.gate.validate(public.id())?;
            publics.push(public);
        }

        let to_put = match self.config.write_mode {
            WriteMode::CheckFirst => {
                let mut keep = Vec::with_capacity(publics.len());
                for public in publics {
                    if !self.store.has(public.id())? {
                        keep.push(public);
                    }
                }
                keep
            }
            WriteMode::WriteThrough => publics,
        };

        self.store.put_many(&to_put)?;
        for public in &to_put {
            self.events.publish(BlockEvent::Added(public.id().clone()));
            debug!(id = %public.id(), "block added");
            self.announce(public).await?;
        }
        Ok(())
    }

    /// Delete one block from the local store.
    ///
    /// Local only: the exchange has no concept of deletion, and prior
    /// announcements are not retracted.
    pub fn delete(&self, id: &BlockId) -> ServiceResult<()> {
        let public = id.public_form();
        if self.store.delete(&public)? {
            self.events.publish(BlockEvent::Deleted(public.clone()));
            debug!(id = %public, "block deleted");
        }
        Ok(())
    }

    /// Shut the service down, releasing the exchange.
    ///
    /// Subsequent writes fail at the announcement step with
    /// [`ServiceError::Closed`].
    pub async fn close(&self) -> ServiceResult<()> {
        debug!("block service shutting down");
        match &self.exchange {
            Some(exchange) => Ok(exchange.close().await?),
            None => Ok(()),
        }
    }

    async fn announce(&self, public: &PublicBlock) -> ServiceResult<()> {
        let Some(exchange) = &self.exchange else {
            return Ok(());
        };
        if let Err(err) = exchange.announce(public).await {
            warn!(id = %public.id(), %err, "announcement failed after local persist");
            return Err(ServiceError::Closed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for BlockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockService")
            .field("write_mode", &self.config.write_mode)
            .field("offline", &self.exchange.is_none())
            .finish()
    }
}
