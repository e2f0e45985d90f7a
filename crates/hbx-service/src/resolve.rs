//! Local-then-remote block resolution, shared by the service facade and
//! per-request sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use hbx_exchange::Fetcher;
use hbx_gate::GatePolicy;
use hbx_store::{BlockStore, StoreError};
use hbx_types::{BlockId, DecryptedBlock};

use crate::error::{ServiceError, ServiceResult};
use crate::events::{BlockEvent, EventSink};

/// Capacity of a batched-read output channel. Small on purpose: the
/// producing task suspends on a full channel and resumes as the caller
/// drains, which is also where caller cancellation is observed.
const BATCH_CHANNEL_CAPACITY: usize = 16;

/// Resolve a single key: local store first, exchange on a miss.
pub(crate) async fn get_block(
    store: &dyn BlockStore,
    fetcher: Option<&dyn Fetcher>,
    gate: &GatePolicy,
    events: &dyn EventSink,
    id: &BlockId,
) -> ServiceResult<DecryptedBlock> {
    let public = id.public_form();
    gate.validate(&public)?;

    match store.get(&public) {
        Ok(hit) => return Ok(DecryptedBlock::reconstitute(hit.into_data(), id)?),
        Err(StoreError::NotFound(_)) => {}
        Err(other) => return Err(other.into()),
    }

    let Some(fetcher) = fetcher else {
        debug!(id = %public, "local miss with no exchange configured");
        return Err(ServiceError::NotFound(public));
    };

    debug!(id = %public, "local miss, querying exchange");
    let fetched = fetcher.fetch_one(&public).await?;
    events.publish(BlockEvent::Fetched(public));
    Ok(DecryptedBlock::reconstitute(fetched.into_data(), id)?)
}

/// Resolve a batch of keys into a result stream.
///
/// Returns immediately; exactly one background task owns the sender and
/// closes it on every exit path. Results arrive in no particular order, at
/// most once per requested key, and only for requested keys. Inadmissible
/// identifiers are logged and dropped from the request; per-key local
/// failures become exchange misses; undecryptable payloads are dropped.
pub(crate) fn get_blocks(
    store: Arc<dyn BlockStore>,
    fetcher: Option<Arc<dyn Fetcher>>,
    gate: GatePolicy,
    events: Arc<dyn EventSink>,
    ids: Vec<BlockId>,
) -> mpsc::Receiver<DecryptedBlock> {
    let (tx, rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        // Public form -> the caller's original identifier, which carries the
        // key material needed to reconstitute. Also dedups repeated keys.
        let mut pending: HashMap<BlockId, BlockId> = HashMap::new();
        for id in ids {
            let public = id.public_form();
            if let Err(err) = gate.validate(&public) {
                warn!(id = %public, %err, "dropping inadmissible identifier from batch read");
                continue;
            }
            pending.entry(public).or_insert(id);
        }

        // Sequential local scan: the store is assumed cheap and internally
        // concurrent where it wants to be; the remote path is where batching
        // pays for itself.
        let mut misses: Vec<BlockId> = Vec::new();
        let keys: Vec<BlockId> = pending.keys().cloned().collect();
        for public in keys {
            let hit = match store.get(&public) {
                Ok(hit) => hit,
                Err(StoreError::NotFound(_)) => {
                    misses.push(public);
                    continue;
                }
                Err(err) => {
                    debug!(id = %public, %err, "local read failed, deferring to exchange");
                    misses.push(public);
                    continue;
                }
            };
            let Some(original) = pending.remove(&public) else {
                continue;
            };
            let block = match DecryptedBlock::reconstitute(hit.into_data(), &original) {
                Ok(block) => block,
                Err(err) => {
                    debug!(id = %original.public_form(), %err, "dropping undecryptable local block");
                    continue;
                }
            };
            if tx.send(block).await.is_err() {
                // Caller hung up; abandon the rest of the batch.
                return;
            }
        }

        if misses.is_empty() {
            return;
        }
        let Some(fetcher) = fetcher else {
            debug!(misses = misses.len(), "local misses with no exchange configured");
            return;
        };

        let mut remote = match fetcher.fetch_many(misses).await {
            Ok(stream) => stream,
            Err(err) => {
                debug!(%err, "batched exchange fetch failed");
                return;
            }
        };
        while let Some(fetched) = remote.recv().await {
            // Unknown or already-delivered keys are dropped: the stream only
            // ever carries requested keys, at most once each.
            let Some(original) = pending.remove(fetched.id()) else {
                continue;
            };
            let block = match DecryptedBlock::reconstitute(fetched.into_data(), &original) {
                Ok(block) => block,
                Err(err) => {
                    debug!(id = %original.public_form(), %err, "dropping undecryptable fetched block");
                    continue;
                }
            };
            events.publish(BlockEvent::Fetched(original.public_form()));
            if tx.send(block).await.is_err() {
                return;
            }
        }
    });

    rx
}
