use serde::{Deserialize, Serialize};

use hbx_gate::GatePolicy;

/// Write-path behavior of the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Check the store for existence first; skip both the write and the
    /// exchange announcement when the block is already held. Avoids
    /// re-announcing data the exchange already believes is locally
    /// available.
    #[default]
    CheckFirst,

    /// Always write and always announce, guaranteeing that a `put` followed
    /// by a `get` observes the write and that peers hear a fresh
    /// announcement even for data already held.
    WriteThrough,
}

/// Configuration for a [`BlockService`](crate::BlockService).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Write-path mode.
    pub write_mode: WriteMode,
    /// Identifier admissibility policy applied to every operation.
    pub gate: GatePolicy,
}
