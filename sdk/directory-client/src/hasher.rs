//! Identifier hashing.
//!
//! Every directory account is keyed by the SHA-256 digest of the normalized
//! identifier, never by the identifier itself. Normalization happens first
//! (see [`crate::identifier`]); this module only enforces the length limit and
//! hashes the canonical UTF-8 bytes.

use std::fmt;

use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

use crate::constants::{DIGEST_LENGTH, MAX_IDENTIFIER_LENGTH};
use crate::errors::{DirectoryError, Result};

/// 32-byte digest of a normalized identifier
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IdentifierDigest(pub [u8; DIGEST_LENGTH]);

impl IdentifierDigest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }
}

impl AsRef<[u8]> for IdentifierDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_LENGTH]> for IdentifierDigest {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for IdentifierDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for IdentifierDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentifierDigest({})", self)
    }
}

/// Hash a normalized identifier.
///
/// Fails with `InvalidIdentifierLength` when the identifier is longer than
/// 255 bytes; no partial digest is produced.
pub fn hash_identifier(identifier: &str) -> Result<IdentifierDigest> {
    let bytes = identifier.as_bytes();
    if bytes.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DirectoryError::InvalidIdentifierLength {
            len: bytes.len(),
            max: MAX_IDENTIFIER_LENGTH,
        });
    }

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok(IdentifierDigest(hasher.finalize().into()))
}
