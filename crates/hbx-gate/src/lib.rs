//! Identifier admissibility for the HBX block service.
//!
//! Every operation that addresses the local store or the exchange first runs
//! the identifier's public form through a [`GatePolicy`]. The policy rejects
//! identifiers built from hash functions considered cryptographically
//! unsound and digests too short to be safely content-verified later; data
//! admitted past the gate is data the node can always re-verify.
//!
//! A rejection fails the individual operation, never the process.

pub mod policy;

pub use policy::{AdmissibilityError, GatePolicy};
