use tokio::sync::broadcast;

use hbx_types::BlockId;

/// Informational events emitted by the service.
///
/// Events always carry the public-form identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockEvent {
    /// A block was persisted to the local store.
    Added(BlockId),
    /// A block was fetched from the exchange on a local miss.
    Fetched(BlockId),
    /// A block was removed from the local store.
    Deleted(BlockId),
}

impl BlockEvent {
    /// The identifier the event is about.
    pub fn id(&self) -> &BlockId {
        match self {
            Self::Added(id) | Self::Fetched(id) | Self::Deleted(id) => id,
        }
    }
}

/// Observer for [`BlockEvent`]s, injected at service construction.
///
/// Sinks must not block the calling operation and must not fail it; delivery
/// is fire-and-forget.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn publish(&self, event: BlockEvent);
}

/// Discards every event. The default sink.
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn publish(&self, _event: BlockEvent) {}
}

/// Fan-out sink over a tokio broadcast channel.
///
/// Slow or absent subscribers never hold up the service: a send with no
/// receivers (or a lagging receiver) is simply dropped.
pub struct BroadcastEvents {
    tx: broadcast::Sender<BlockEvent>,
}

impl BroadcastEvents {
    /// Create a sink with the given per-subscriber channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BlockEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastEvents {
    fn publish(&self, event: BlockEvent) {
        // A send without receivers is fine; events are informational.
        let _ = self.tx.send(event);
    }
}
