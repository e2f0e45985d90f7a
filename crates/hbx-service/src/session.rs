use std::sync::Arc;

use tokio::sync::mpsc;

use hbx_exchange::Fetcher;
use hbx_gate::GatePolicy;
use hbx_store::BlockStore;
use hbx_types::{BlockId, DecryptedBlock};

use crate::error::ServiceResult;
use crate::events::EventSink;
use crate::resolve;

/// A read-only handle scoped to one logical request sequence.
///
/// Sessions exist so that a sequence of related reads (say, traversing one
/// DAG) can share exchange-side bookkeeping instead of re-negotiating per
/// key. They carry no write capability and no persistent identity; drop the
/// session when the request context ends.
///
/// Obtained from [`BlockService::session`](crate::BlockService::session).
pub struct Session {
    store: Arc<dyn BlockStore>,
    fetcher: Option<Arc<dyn Fetcher>>,
    gate: GatePolicy,
    events: Arc<dyn EventSink>,
}

impl Session {
    pub(crate) fn new(
        store: Arc<dyn BlockStore>,
        fetcher: Option<Arc<dyn Fetcher>>,
        gate: GatePolicy,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            fetcher,
            gate,
            events,
        }
    }

    /// Get one block in the context of this session.
    ///
    /// Same contract as [`BlockService::get`](crate::BlockService::get).
    pub async fn get(&self, id: &BlockId) -> ServiceResult<DecryptedBlock> {
        resolve::get_block(
            self.store.as_ref(),
            self.fetcher.as_deref(),
            &self.gate,
            self.events.as_ref(),
            id,
        )
        .await
    }

    /// Get a batch of blocks in the context of this session.
    ///
    /// Same contract as [`BlockService::get_many`](crate::BlockService::get_many).
    pub fn get_many(&self, ids: Vec<BlockId>) -> mpsc::Receiver<DecryptedBlock> {
        resolve::get_blocks(
            Arc::clone(&self.store),
            self.fetcher.clone(),
            self.gate.clone(),
            Arc::clone(&self.events),
            ids,
        )
    }
}
