//! SHA-256 digest newtype for release verification.
//!
//! The catalog publishes each archive's checksum as 64 hex characters; the
//! digest is kept as the 32 raw bytes so that the extraction gate compares
//! bytes rather than strings.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Errors arising from malformed checksum text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SHA-256 digest \"{value}\": {reason}")]
pub struct DigestError {
    /// The rejected checksum text.
    pub value: String,
    /// Description of the validation failure.
    pub reason: String,
}

/// A SHA-256 digest held as raw bytes.
///
/// # Examples
///
/// ```
/// use goenv::release::sha256_digest::Sha256Digest;
///
/// let hex = "ab".repeat(32);
/// let digest = Sha256Digest::from_hex(&hex)?;
/// assert_eq!(digest.as_bytes().len(), 32);
/// assert_eq!(digest.to_string(), hex);
/// # Ok::<(), goenv::release::sha256_digest::DigestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; DIGEST_LEN]);

impl Sha256Digest {
    /// Decode a hex-encoded digest.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError`] if the text is not exactly 64 hex characters.
    pub fn from_hex(value: &str) -> Result<Self, DigestError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(value, &mut bytes).map_err(|err| DigestError {
            value: value.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Hash everything `reader` yields.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading.
    pub fn of_reader(reader: &mut impl Read) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(reader, &mut hasher)?;
        Ok(Self(hasher.finalize().into()))
    }

    /// Hash an in-memory buffer.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Return the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
