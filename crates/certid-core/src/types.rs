use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp (seconds, UTC). Supplied by the host's block context —
/// handlers never read the local wall clock.
pub type Timestamp = i64;

/// Block height, supplied by the host alongside `Timestamp`.
pub type Height = u64;

// ── Addr ─────────────────────────────────────────────────────────────────────

/// Canonical account identifier: 20 bytes, rendered as base58.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Addr(pub [u8; 20]);

impl Addr {
    pub fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, crate::error::CertIdError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| crate::error::CertIdError::InvalidArgument(format!("bad address '{s}': {e}")))?;
        if bytes.len() != 20 {
            return Err(crate::error::CertIdError::InvalidArgument(format!(
                "address '{s}' decodes to {} bytes, want 20",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Sentinel used for "no resolver" / "no authority configured".
    pub fn zero() -> Self {
        Self([0u8; 20])
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({})", self.to_b58())
    }
}

// ── Uid ──────────────────────────────────────────────────────────────────────

/// 32-byte content-derived identifier, rendered as lower-hex. Used for
/// schema uids and attestation uids — anywhere the data model calls for a
/// `UID`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uid(pub [u8; 32]);

impl Uid {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, crate::error::CertIdError> {
        let bytes = hex::decode(s)
            .map_err(|e| crate::error::CertIdError::InvalidArgument(format!("bad uid '{s}': {e}")))?;
        if bytes.len() != 32 {
            return Err(crate::error::CertIdError::InvalidArgument(format!(
                "uid '{s}' decodes to {} bytes, want 32",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({}…)", &self.to_hex()[..12])
    }
}
