//! The service's co-signature
//!
//! Holds the guard's own key pair, loaded once at startup and read-only
//! for the process lifetime. Signing is RFC 6979 deterministic per content
//! hash and shares no mutable state, so it is safe to invoke from any
//! number of concurrent authorization flows.

use crate::core::Transaction;
use crate::crypto::{KeyError, KeyPair};

/// Produces the second, authorizing signature over approved transfers
#[derive(Clone)]
pub struct CoSigner {
    key_pair: KeyPair,
}

impl CoSigner {
    /// Create a co-signer from the service's key pair
    pub fn new(key_pair: KeyPair) -> Self {
        Self { key_pair }
    }

    /// The service's public key (compressed, hex)
    pub fn public_key_hex(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Attach the co-signature over the transaction's content hash
    pub fn cosign(&self, tx: &mut Transaction) -> Result<(), KeyError> {
        let signature = self.key_pair.sign(&tx.hash().0)?;
        tx.cosig = hex::encode(signature);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountId;
    use crate::crypto::verify_signature;

    fn sample_tx() -> Transaction {
        Transaction::new(AccountId([1u8; 32]), AccountId([2u8; 32]), 10, 0, 0)
    }

    #[test]
    fn test_cosign_attaches_verifiable_signature() {
        let signer = CoSigner::new(KeyPair::generate());
        let mut tx = sample_tx();

        signer.cosign(&mut tx).unwrap();
        assert!(tx.is_cosigned());

        let public_key =
            crate::crypto::public_key_from_hex(&signer.public_key_hex()).unwrap();
        let sig = hex::decode(&tx.cosig).unwrap();
        assert!(verify_signature(&public_key, &tx.hash().0, &sig).unwrap());
    }

    #[test]
    fn test_cosign_is_deterministic_per_hash() {
        let signer = CoSigner::new(KeyPair::generate());
        let mut tx1 = sample_tx();
        let mut tx2 = sample_tx();

        signer.cosign(&mut tx1).unwrap();
        signer.cosign(&mut tx2).unwrap();
        assert_eq!(tx1.cosig, tx2.cosig);
    }
}
