//! Identifiers used throughout SharePool.
//!
//! Participants and the operator share one identity type: a 20-byte
//! account address, rendered as `0x`-prefixed lowercase hex.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::SharePoolError;

/// Length of an account address in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a pool participant or operator.
///
/// Serialized as a hex string so it reads naturally in config files and
/// JSON event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = SharePoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| SharePoolError::Configuration(format!("invalid account id {s:?}: {e}")))?;
        let bytes: [u8; ACCOUNT_ID_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            SharePoolError::Configuration(format!(
                "invalid account id {s:?}: expected {ACCOUNT_ID_LEN} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for AccountId {
    type Error = SharePoolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

/// Random identities for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_hex() {
        let id = AccountId::from_bytes([0x0f; 20]);
        assert_eq!(id.to_string(), format!("0x{}", "0f".repeat(20)));
    }

    #[test]
    fn parse_with_and_without_prefix() {
        let id = AccountId::random();
        let with: AccountId = id.to_string().parse().unwrap();
        let without: AccountId = hex::encode(id.as_bytes()).parse().unwrap();
        assert_eq!(with, id);
        assert_eq!(without, id);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "0xdeadbeef".parse::<AccountId>().unwrap_err();
        assert!(matches!(err, SharePoolError::Configuration(ref m) if m.contains("20 bytes")));
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!("0xzz".parse::<AccountId>().is_err());
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(AccountId::random(), AccountId::random());
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = AccountId::from_bytes([0xAB; 20]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
