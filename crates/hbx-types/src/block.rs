use bytes::Bytes;

use hbx_crypto::{seal, unseal, HashAlg, SecretKey};

use crate::error::TypeError;
use crate::id::{BlockId, Codec};

/// An immutable pair of content identifier and payload, as built by callers.
///
/// For a plaintext block the payload is the content itself. For a
/// confidential block the payload is the sealed ciphertext and the
/// identifier embeds the key; the digest always covers the stored bytes, so
/// stores and peers can verify content without ever seeing plaintext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    data: Bytes,
}

impl Block {
    /// Build a plaintext block addressed by the digest of `data`.
    pub fn new(alg: HashAlg, codec: Codec, data: impl Into<Bytes>) -> Result<Self, TypeError> {
        let data = data.into();
        let digest = hbx_crypto::digest(alg, &data)?;
        Ok(Self {
            id: BlockId::new(alg, codec, digest),
            data,
        })
    }

    /// Seal `plaintext` under `key` and build a confidential block.
    ///
    /// The digest is computed over the ciphertext and the key rides in the
    /// identifier, so the block can be stored and exchanged without exposing
    /// the plaintext.
    pub fn seal(
        alg: HashAlg,
        codec: Codec,
        plaintext: &[u8],
        key: SecretKey,
    ) -> Result<Self, TypeError> {
        let sealed = seal(&key, plaintext)?;
        let digest = hbx_crypto::digest(alg, &sealed)?;
        Ok(Self {
            id: BlockId::with_key(alg, codec, digest, key),
            data: sealed.into(),
        })
    }

    /// Rebuild a block from parts produced elsewhere (importers, decoders).
    ///
    /// No digest check happens here; stores verify on put.
    pub fn from_parts(id: BlockId, data: impl Into<Bytes>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    /// The block's identifier (may carry key material).
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// The stored payload: plaintext, or ciphertext for confidential blocks.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Whether the identifier embeds a payload key.
    pub fn is_confidential(&self) -> bool {
        self.id.is_confidential()
    }

    /// Project to the storage/exchange shape: public-form identifier,
    /// payload unchanged (sealing already happened at construction).
    ///
    /// Fails only on internal inconsistency between the declared algorithm
    /// and the digest it supposedly produced.
    pub fn to_public(&self) -> Result<PublicBlock, TypeError> {
        let expected = self.id.alg().digest_len();
        if self.id.digest().len() != expected {
            return Err(TypeError::DigestLength {
                expected,
                actual: self.id.digest().len(),
            });
        }
        Ok(PublicBlock {
            id: self.id.public_form(),
            data: self.data.clone(),
        })
    }
}

/// The projection of a block that stores and peers handle.
///
/// Its identifier is always the public form and its payload is whatever is
/// safe to expose: ciphertext for confidential blocks, plaintext otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicBlock {
    id: BlockId,
    data: Bytes,
}

impl PublicBlock {
    /// Build from an identifier and storage-safe bytes. The identifier is
    /// normalized to its public form.
    pub fn new(id: BlockId, data: impl Into<Bytes>) -> Self {
        Self {
            id: id.public_form(),
            data: data.into(),
        }
    }

    /// Public-form identifier.
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Storage-safe payload bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the block, keeping only the payload.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// The caller-facing projection of a fetched block.
///
/// Carries the identifier the caller originally asked with and the plaintext
/// payload, decrypted with the identifier's embedded key when present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedBlock {
    id: BlockId,
    data: Bytes,
}

impl DecryptedBlock {
    /// Reconstitute the caller-facing block from publicly fetched bytes.
    ///
    /// Identity transform when `original` carries no key; AEAD open when it
    /// does. An open failure is an error, never a miss.
    pub fn reconstitute(raw: Bytes, original: &BlockId) -> Result<Self, TypeError> {
        let data = match original.key() {
            None => raw,
            Some(key) => unseal(key, &raw)?.into(),
        };
        Ok(Self {
            id: original.clone(),
            data,
        })
    }

    /// The identifier the caller supplied.
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Plaintext payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the block, keeping only the payload.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}
