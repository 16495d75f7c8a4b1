//! Funds-transfer transactions awaiting co-signature
//!
//! A transfer is proposed and signed by the sending account (the primary
//! signer) and must collect a second signature from this service before it
//! may propagate. The content hash over the canonical fields identifies the
//! transaction and is the message both signatures cover.

use crate::core::account::AccountId;
use crate::crypto::{sha256_array, KeyPair};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transaction-related errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Crypto error: {0}")]
    CryptoError(#[from] crate::crypto::KeyError),
}

/// Content-derived 32-byte transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A two-signature funds transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Sender account (the primary signer)
    pub from: AccountId,
    /// Recipient account
    pub to: AccountId,
    /// Amount to transfer
    pub amount: u64,
    /// Transfer fee; `amount + fee` is the total debit against `from`
    #[serde(default)]
    pub fee: u64,
    /// Sender's sequence number; must match the account's next expected
    /// value at authorization time
    pub nonce: u32,
    /// Primary signature over the content hash (hex, empty = unsigned)
    #[serde(default)]
    pub primary_sig: String,
    /// Co-signature produced by this service (hex, empty until authorized)
    #[serde(default)]
    pub cosig: String,
}

impl Transaction {
    /// Create a new unsigned transfer
    pub fn new(from: AccountId, to: AccountId, amount: u64, fee: u64, nonce: u32) -> Self {
        Self {
            from,
            to,
            amount,
            fee,
            nonce,
            primary_sig: String::new(),
            cosig: String::new(),
        }
    }

    /// Calculate the content hash over the canonical fields
    ///
    /// Signatures are excluded so the hash is stable before and after
    /// signing; two transactions with the same hash are the same logical
    /// transaction.
    pub fn hash(&self) -> TxHash {
        let data = format!(
            "{}{}{}{}{}",
            self.from.to_hex(),
            self.to.to_hex(),
            self.amount,
            self.fee,
            self.nonce
        );
        TxHash(sha256_array(data.as_bytes()))
    }

    /// Total debit against the sender
    pub fn total_debit(&self) -> u64 {
        self.amount.saturating_add(self.fee)
    }

    /// Sign as the primary signer (the proposing account)
    pub fn sign_primary(&mut self, key_pair: &KeyPair) -> Result<(), TransactionError> {
        let signature = key_pair.sign(&self.hash().0)?;
        self.primary_sig = hex::encode(signature);
        Ok(())
    }

    /// Whether the service's co-signature is attached
    pub fn is_cosigned(&self) -> bool {
        !self.cosig.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new(AccountId([1u8; 32]), AccountId([2u8; 32]), 60, 1, 0)
    }

    #[test]
    fn test_hash_is_deterministic() {
        let tx1 = sample_tx();
        let tx2 = sample_tx();
        assert_eq!(tx1.hash(), tx2.hash());
    }

    #[test]
    fn test_hash_ignores_signatures() {
        let mut tx = sample_tx();
        let before = tx.hash();

        let kp = KeyPair::generate();
        tx.sign_primary(&kp).unwrap();
        tx.cosig = "ab".repeat(32);

        assert_eq!(tx.hash(), before);
    }

    #[test]
    fn test_hash_covers_all_canonical_fields() {
        let base = sample_tx();
        let mut changed = sample_tx();
        changed.nonce = 1;
        assert_ne!(base.hash(), changed.hash());

        let mut changed = sample_tx();
        changed.fee = 2;
        assert_ne!(base.hash(), changed.hash());

        let mut changed = sample_tx();
        changed.to = AccountId([3u8; 32]);
        assert_ne!(base.hash(), changed.hash());
    }

    #[test]
    fn test_total_debit() {
        let tx = sample_tx();
        assert_eq!(tx.total_debit(), 61);
        let tx = Transaction::new(AccountId([1u8; 32]), AccountId([2u8; 32]), u64::MAX, 1, 0);
        assert_eq!(tx.total_debit(), u64::MAX);
    }

    #[test]
    fn test_is_cosigned() {
        let mut tx = sample_tx();
        assert!(!tx.is_cosigned());
        tx.cosig = "00".repeat(64);
        assert!(tx.is_cosigned());
    }
}
