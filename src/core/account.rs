//! Account identifiers and remote account snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 32-byte account identifier (hash of the account's public key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Get the identifier as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse an identifier from a 64-character hex string
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Authoritative account state fetched from the remote ledger
///
/// Fetched fresh for every authorization decision and never cached across
/// decisions: it may be stale the instant it is read, which is exactly why
/// the pending ledger projection exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Confirmed balance on the remote ledger
    pub balance: u64,
    /// Next expected sequence number for the account
    pub nonce: u32,
    /// Root accounts (e.g. the issuance account) are exempt from balance
    /// checks but not from signature or nonce checks
    #[serde(default)]
    pub is_root: bool,
    /// The account's public key (compressed secp256k1, hex)
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_hex_roundtrip() {
        let id = AccountId([7u8; 32]);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(AccountId::from_hex(&hex), Some(id));
    }

    #[test]
    fn test_account_id_rejects_bad_hex() {
        assert!(AccountId::from_hex("zz").is_none());
        assert!(AccountId::from_hex("ab").is_none());
    }

    #[test]
    fn test_snapshot_is_root_defaults_false() {
        let json = r#"{"balance": 10, "nonce": 0, "public_key": "02ab"}"#;
        let snap: AccountSnapshot = serde_json::from_str(json).unwrap();
        assert!(!snap.is_root);
    }
}
