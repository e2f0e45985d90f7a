use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use hbx_crypto::{HashAlg, SecretKey};

use crate::error::TypeError;

/// Content-encoding tag carried by a [`BlockId`].
///
/// Opaque to this service; consumers use it to pick a decoder for the
/// block's payload. Codes follow the multicodec registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    /// Raw bytes.
    Raw,
    /// DAG-CBOR structured data.
    DagCbor,
}

impl Codec {
    /// Multicodec wire code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Raw => 0x55,
            Self::DagCbor => 0x71,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            0x55 => Ok(Self::Raw),
            0x71 => Ok(Self::DagCbor),
            other => Err(TypeError::UnknownCodec(other)),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Raw => "raw",
            Self::DagCbor => "dag-cbor",
        };
        write!(f, "{s}")
    }
}

/// Self-describing content identifier.
///
/// A `BlockId` names a block by the digest of its stored bytes under a
/// declared hash algorithm, plus a content-encoding tag. Two identifiers are
/// equal iff their encoded bytes are equal.
///
/// An identifier may additionally embed a [`SecretKey`] for confidential
/// payloads. The key is deliberately excluded from equality, ordering,
/// hashing, encoding, and serde: [`public_form`](Self::public_form) is the
/// only shape that ever reaches a store or the network.
#[derive(Clone)]
pub struct BlockId {
    alg: HashAlg,
    codec: Codec,
    digest: Vec<u8>,
    key: Option<SecretKey>,
}

impl BlockId {
    /// Build an identifier from its public parts.
    pub fn new(alg: HashAlg, codec: Codec, digest: Vec<u8>) -> Self {
        Self {
            alg,
            codec,
            digest,
            key: None,
        }
    }

    /// Build a confidential identifier carrying a payload key.
    pub fn with_key(alg: HashAlg, codec: Codec, digest: Vec<u8>, key: SecretKey) -> Self {
        Self {
            alg,
            codec,
            digest,
            key: Some(key),
        }
    }

    /// Declared hash algorithm.
    pub fn alg(&self) -> HashAlg {
        self.alg
    }

    /// Content-encoding tag.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Embedded payload key, if any.
    pub fn key(&self) -> Option<&SecretKey> {
        self.key.as_ref()
    }

    /// Whether this identifier carries a payload key.
    pub fn is_confidential(&self) -> bool {
        self.key.is_some()
    }

    /// The identifier with any embedded key stripped.
    ///
    /// Idempotent; this is the only form persisted or transmitted.
    pub fn public_form(&self) -> BlockId {
        BlockId {
            alg: self.alg,
            codec: self.codec,
            digest: self.digest.clone(),
            key: None,
        }
    }

    /// Public wire encoding: `[alg][codec][digest-len][digest]`.
    ///
    /// The embedded key, if any, is never encoded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + self.digest.len());
        out.push(self.alg.code());
        out.push(self.codec.code());
        out.push(self.digest.len() as u8);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Decode the public wire encoding.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        if data.len() < 3 {
            return Err(TypeError::Truncated {
                expected: 3,
                actual: data.len(),
            });
        }
        let alg = HashAlg::from_code(data[0])?;
        let codec = Codec::from_code(data[1])?;
        let len = data[2] as usize;
        if data.len() != 3 + len {
            return Err(TypeError::Truncated {
                expected: 3 + len,
                actual: data.len(),
            });
        }
        Ok(Self::new(alg, codec, data[3..].to_vec()))
    }

    /// Hex-encoded public wire encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from the hex encoding produced by [`to_hex`](Self::to_hex).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Short digest prefix for log lines.
    pub fn short_hex(&self) -> String {
        let end = self.digest.len().min(4);
        hex::encode(&self.digest[..end])
    }
}

// Equality, ordering, and hashing cover only the public-addressing triple.
// The embedded key must never influence where a block lives.

impl PartialEq for BlockId {
    fn eq(&self, other: &Self) -> bool {
        self.alg == other.alg && self.codec == other.codec && self.digest == other.digest
    }
}

impl Eq for BlockId {}

impl Hash for BlockId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alg.code().hash(state);
        self.codec.code().hash(state);
        self.digest.hash(state);
    }
}

impl PartialOrd for BlockId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockId {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.alg.code(), self.codec.code(), &self.digest).cmp(&(
            other.alg.code(),
            other.codec.code(),
            &other.digest,
        ))
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({}:{})", self.alg, self.short_hex())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_id() -> BlockId {
        let digest = hbx_crypto::digest(HashAlg::Blake3, b"test payload").unwrap();
        BlockId::new(HashAlg::Blake3, Codec::Raw, digest)
    }

    #[test]
    fn public_form_is_idempotent() {
        let key = SecretKey::generate();
        let id = BlockId::with_key(HashAlg::Blake3, Codec::Raw, vec![7u8; 32], key);
        let once = id.public_form();
        let twice = once.public_form();
        assert!(!once.is_confidential());
        assert_eq!(once, twice);
        assert_eq!(once.to_bytes(), twice.to_bytes());
    }

    #[test]
    fn equality_ignores_key_material() {
        let digest = vec![9u8; 32];
        let plain = BlockId::new(HashAlg::Sha2_256, Codec::Raw, digest.clone());
        let keyed = BlockId::with_key(HashAlg::Sha2_256, Codec::Raw, digest, SecretKey::generate());
        assert_eq!(plain, keyed);
        assert_eq!(plain.to_bytes(), keyed.to_bytes());
    }

    #[test]
    fn different_codecs_are_different_ids() {
        let digest = vec![9u8; 32];
        let raw = BlockId::new(HashAlg::Sha2_256, Codec::Raw, digest.clone());
        let cbor = BlockId::new(HashAlg::Sha2_256, Codec::DagCbor, digest);
        assert_ne!(raw, cbor);
    }

    #[test]
    fn bytes_roundtrip() {
        let id = test_id();
        let parsed = BlockId::from_bytes(&id.to_bytes()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(parsed.alg(), HashAlg::Blake3);
        assert_eq!(parsed.codec(), Codec::Raw);
    }

    #[test]
    fn hex_roundtrip() {
        let id = test_id();
        assert_eq!(BlockId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn truncated_encoding_rejected() {
        let id = test_id();
        let mut bytes = id.to_bytes();
        bytes.pop();
        assert!(matches!(
            BlockId::from_bytes(&bytes),
            Err(TypeError::Truncated { .. })
        ));
        assert!(matches!(
            BlockId::from_bytes(&[]),
            Err(TypeError::Truncated { .. })
        ));
    }

    #[test]
    fn unknown_codes_rejected() {
        assert!(BlockId::from_bytes(&[0x99, 0x55, 0]).is_err());
        assert!(matches!(
            BlockId::from_bytes(&[0x12, 0x99, 0]),
            Err(TypeError::UnknownCodec(0x99))
        ));
    }

    #[test]
    fn serde_roundtrip_strips_key() {
        let id = BlockId::with_key(
            HashAlg::Blake3,
            Codec::DagCbor,
            vec![3u8; 32],
            SecretKey::generate(),
        );
        let json = serde_json::to_string(&id).unwrap();
        let parsed: BlockId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(!parsed.is_confidential());
    }

    #[test]
    fn display_and_debug() {
        let id = test_id();
        assert_eq!(format!("{id}"), id.to_hex());
        let debug = format!("{id:?}");
        assert!(debug.starts_with("BlockId(blake3:"));
    }

    #[test]
    fn short_hex_handles_tiny_digests() {
        let id = BlockId::new(HashAlg::Sha2_256, Codec::Raw, vec![0xab, 0xcd]);
        assert_eq!(id.short_hex(), "abcd");
    }

    proptest! {
        #[test]
        fn encoding_roundtrips(alg in prop_oneof![
            Just(HashAlg::Sha1),
            Just(HashAlg::Sha2_256),
            Just(HashAlg::Sha2_512),
            Just(HashAlg::Blake3),
            Just(HashAlg::Md5),
        ], codec in prop_oneof![Just(Codec::Raw), Just(Codec::DagCbor)],
           digest in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let id = BlockId::new(alg, codec, digest);
            prop_assert_eq!(BlockId::from_bytes(&id.to_bytes()).unwrap(), id);
        }

        #[test]
        fn public_form_fixpoint(digest in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let id = BlockId::with_key(
                HashAlg::Blake3,
                Codec::Raw,
                digest,
                SecretKey::new([0x5au8; 32]),
            );
            let once = id.public_form();
            prop_assert_eq!(once.to_bytes(), once.public_form().to_bytes());
        }
    }
}
