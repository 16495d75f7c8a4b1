//! Primary-signature verification
//!
//! Validates the proposing account's signature over the transaction's
//! content hash against the public key declared in the account snapshot.
//! Root accounts are not exempt: the root exemption covers the balance
//! check only.

use crate::core::Transaction;
use crate::crypto::{public_key_from_hex, verify_signature};
use thiserror::Error;

/// Primary-signature verification failures
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Primary signature missing")]
    MissingSignature,
    #[error("Primary signature malformed")]
    MalformedSignature,
    #[error("Account public key malformed")]
    MalformedPublicKey,
    #[error("Primary signature does not verify")]
    InvalidSignature,
}

/// Verify the primary signature over `tx.hash()` against `public_key_hex`
pub fn verify_primary(tx: &Transaction, public_key_hex: &str) -> Result<(), VerifyError> {
    if tx.primary_sig.is_empty() {
        return Err(VerifyError::MissingSignature);
    }

    let public_key =
        public_key_from_hex(public_key_hex).map_err(|_| VerifyError::MalformedPublicKey)?;
    let signature =
        hex::decode(&tx.primary_sig).map_err(|_| VerifyError::MalformedSignature)?;

    match verify_signature(&public_key, &tx.hash().0, &signature) {
        Ok(true) => Ok(()),
        _ => Err(VerifyError::InvalidSignature),
    }
}
