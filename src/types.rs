//! Core value types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a SHA-256 digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Raw SHA-256 output
pub type Hash = [u8; 32];

/// Lowercase hexadecimal SHA-256 digest.
///
/// Two digests are equal iff the byte sequences that produced them were
/// identical, so the value is the whole identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    #[error("digest must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("digest contains non-hex character {0:?}")]
    NonHex(char),
}

impl Digest {
    /// Build a digest from raw hash output.
    pub fn from_hash(hash: &Hash) -> Self {
        Digest(hex::encode(hash))
    }

    /// Parse a hex digest. Uppercase input is accepted and normalized.
    pub fn from_hex(value: &str) -> Result<Self, DigestParseError> {
        if value.len() != DIGEST_HEX_LEN {
            return Err(DigestParseError::Length {
                expected: DIGEST_HEX_LEN,
                actual: value.len(),
            });
        }
        if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(DigestParseError::NonHex(bad));
        }
        Ok(Digest(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::from_hex(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Digest::from_hex(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
