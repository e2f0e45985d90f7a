//! Test doubles shared by the service, session, and resolver tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use hbx_exchange::{Exchange, ExchangeError, ExchangeResult, Fetcher, SessionExchange};
use hbx_types::{BlockId, PublicBlock};

/// Shared observable state of a [`MockExchange`] and its session fetchers.
pub(crate) struct MockState {
    blocks: Mutex<HashMap<BlockId, Bytes>>,
    pub announced: Mutex<Vec<BlockId>>,
    pub fetch_calls: AtomicUsize,
    pub sessions_opened: AtomicUsize,
    closed: AtomicBool,
}

impl MockState {
    fn lookup(&self, id: &BlockId) -> Option<PublicBlock> {
        let blocks = self.blocks.lock().expect("lock poisoned");
        blocks
            .get(id)
            .map(|data| PublicBlock::new(id.clone(), data.clone()))
    }

    fn lookup_many(&self, ids: &[BlockId]) -> Vec<PublicBlock> {
        ids.iter().filter_map(|id| self.lookup(id)).collect()
    }

    pub fn announced_count(&self) -> usize {
        self.announced.lock().expect("lock poisoned").len()
    }

    /// Make `block` fetchable from the exchange and its session fetchers.
    pub fn seed(&self, block: &PublicBlock) {
        self.blocks
            .lock()
            .expect("lock poisoned")
            .insert(block.id().clone(), block.data().clone());
    }
}

/// In-memory exchange double: fetches resolve against a seeded map,
/// announces are recorded, and `close` flips a flag that fails later
/// announces and fetches.
pub(crate) struct MockExchange {
    pub state: Arc<MockState>,
    supports_sessions: bool,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn with_sessions() -> Self {
        Self::build(true)
    }

    fn build(supports_sessions: bool) -> Self {
        Self {
            state: Arc::new(MockState {
                blocks: Mutex::new(HashMap::new()),
                announced: Mutex::new(Vec::new()),
                fetch_calls: AtomicUsize::new(0),
                sessions_opened: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
            supports_sessions,
        }
    }

    /// Make `block` fetchable from this exchange.
    pub fn seed(&self, block: &PublicBlock) {
        self.state.seed(block);
    }
}

#[async_trait]
impl Fetcher for MockExchange {
    async fn fetch_one(&self, id: &BlockId) -> ExchangeResult<PublicBlock> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(ExchangeError::Closed);
        }
        self.state
            .lookup(id)
            .ok_or_else(|| ExchangeError::NotFound(id.public_form()))
    }

    async fn fetch_many(&self, ids: Vec<BlockId>) -> ExchangeResult<mpsc::Receiver<PublicBlock>> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(ExchangeError::Closed);
        }
        let hits = self.state.lookup_many(&ids);
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for hit in hits {
                if tx.send(hit).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn announce(&self, block: &PublicBlock) -> ExchangeResult<()> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(ExchangeError::Closed);
        }
        self.state
            .announced
            .lock()
            .expect("lock poisoned")
            .push(block.id().clone());
        Ok(())
    }

    async fn close(&self) -> ExchangeResult<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn as_session_exchange(&self) -> Option<&dyn SessionExchange> {
        self.supports_sessions.then_some(self as &dyn SessionExchange)
    }
}

impl SessionExchange for MockExchange {
    fn new_session(&self) -> Arc<dyn Fetcher> {
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockSessionFetcher {
            state: Arc::clone(&self.state),
        })
    }
}

/// Session-scoped fetcher sharing the parent exchange's state.
pub(crate) struct MockSessionFetcher {
    state: Arc<MockState>,
}

#[async_trait]
impl Fetcher for MockSessionFetcher {
    async fn fetch_one(&self, id: &BlockId) -> ExchangeResult<PublicBlock> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .lookup(id)
            .ok_or_else(|| ExchangeError::NotFound(id.public_form()))
    }

    async fn fetch_many(&self, ids: Vec<BlockId>) -> ExchangeResult<mpsc::Receiver<PublicBlock>> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let hits = self.state.lookup_many(&ids);
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for hit in hits {
                if tx.send(hit).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}
