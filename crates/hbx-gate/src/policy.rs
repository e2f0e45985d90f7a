use serde::{Deserialize, Serialize};
use thiserror::Error;

use hbx_crypto::HashAlg;
use hbx_types::BlockId;

/// Why an identifier was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissibilityError {
    #[error("hash algorithm {0} is denied by policy")]
    DeniedAlgorithm(HashAlg),

    #[error("digest too short: {len} bytes (policy minimum {min})")]
    DigestTooShort { len: usize, min: usize },
}

/// Admissibility policy for content identifiers.
///
/// Carries a deny-list of hash algorithms and a minimum digest length. The
/// default denies the legacy algorithms (SHA-1, MD5) and requires at least
/// 20 digest bytes, which every supported modern algorithm clears.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePolicy {
    /// Hash algorithms refused outright.
    pub denied: Vec<HashAlg>,
    /// Minimum acceptable digest length in bytes.
    pub min_digest_len: usize,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            denied: vec![HashAlg::Sha1, HashAlg::Md5],
            min_digest_len: 20,
        }
    }
}

impl GatePolicy {
    /// A policy that admits everything. For tests and closed deployments
    /// that ingest legacy data at their own risk.
    pub fn permissive() -> Self {
        Self {
            denied: Vec::new(),
            min_digest_len: 0,
        }
    }

    /// Check one identifier against this policy.
    ///
    /// Callers pass the public form; the check only reads the algorithm and
    /// digest, so either form gives the same answer.
    pub fn validate(&self, id: &BlockId) -> Result<(), AdmissibilityError> {
        if self.denied.contains(&id.alg()) {
            return Err(AdmissibilityError::DeniedAlgorithm(id.alg()));
        }
        if id.digest().len() < self.min_digest_len {
            return Err(AdmissibilityError::DigestTooShort {
                len: id.digest().len(),
                min: self.min_digest_len,
            });
        }
        Ok(())
    }
}
