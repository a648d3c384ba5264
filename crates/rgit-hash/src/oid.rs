use std::fmt;
use std::str::FromStr;

use crate::hex;
use crate::HashError;

/// Number of bytes in a SHA-1 digest.
pub const DIGEST_LEN: usize = 20;

/// An object identifier — the SHA-1 of an object's serialized form,
/// carried as the raw 20-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; DIGEST_LEN]);

impl ObjectId {
    /// The all-zeros OID.
    pub const NULL: Self = Self([0u8; DIGEST_LEN]);

    /// Create an ObjectId from raw digest bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != DIGEST_LEN {
            return Err(HashError::InvalidDigestLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a 40-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, HashError> {
        let mut arr = [0u8; DIGEST_LEN];
        hex::decode(hex_str, &mut arr)?;
        Ok(Self(arr))
    }

    pub(crate) fn from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        Self(digest)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Is this the all-zeros OID?
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Does the hex form of this OID start with `prefix` (case-insensitive)?
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }

    /// The fan-out path component for loose storage: `"xx/xxxx..."`.
    pub fn bucket_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
