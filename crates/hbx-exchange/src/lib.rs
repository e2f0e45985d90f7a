//! Peer-exchange boundary for the HBX block service.
//!
//! The exchange is the collaborator consulted when the local store misses:
//! it fetches blocks from peers and announces newly held blocks so peers'
//! outstanding interest lists can be satisfied. This crate defines only the
//! boundary -- peer selection, bandwidth negotiation, and want-list
//! propagation live behind these traits.

pub mod error;
pub mod traits;

pub use error::{ExchangeError, ExchangeResult};
pub use traits::{Exchange, Fetcher, SessionExchange};
