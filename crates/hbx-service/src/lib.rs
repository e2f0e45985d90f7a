//! Hybrid block access service.
//!
//! [`BlockService`] is the mediator between "what the caller wants" and
//! "where bytes might live": reads consult the local store first and fall
//! back to the peer exchange on a miss; writes persist locally and announce
//! to the exchange so outstanding peer interest can be satisfied.
//!
//! Every operation runs the identifier's public form through the
//! admissibility gate before any collaborator is touched, and every read
//! hands back a [`DecryptedBlock`](hbx_types::DecryptedBlock) reconstituted
//! with whatever key material the caller's identifier carries -- the store
//! and the exchange only ever see public forms and sealed bytes.
//!
//! [`Session`] offers the same read contract scoped to one logical request
//! sequence, letting session-capable exchanges narrow their want-list
//! bookkeeping.

pub mod config;
pub mod error;
pub mod events;
pub mod service;
pub mod session;

mod resolve;

pub use config::{ServiceConfig, WriteMode};
pub use error::{ServiceError, ServiceResult};
pub use events::{BlockEvent, BroadcastEvents, EventSink, NoopEvents};
pub use service::BlockService;
pub use session::Session;

#[cfg(test)]
pub(crate) mod testing;
