//! Cosign-Guard: co-signing authorization for two-signature funds transfers
//!
//! This crate implements the second-signer side of a multisig transfer
//! scheme: a transfer proposed and signed by a primary account is approved
//! only if the account can afford it once every other in-flight transfer is
//! taken into account. Features:
//! - Pending-transaction ledger with atomic check-then-reserve semantics
//! - Solvency projection over committed in-flight transfers
//! - ECDSA primary-signature verification and deterministic co-signing
//! - Framed TCP protocol for proposals, confirmations, and pending queries
//! - HTTP client for the authoritative remote ledger
//!
//! # Example
//!
//! ```rust
//! use cosign_guard::core::{AccountId, Transaction};
//! use cosign_guard::crypto::KeyPair;
//! use cosign_guard::ledger::PendingLedger;
//!
//! // A primary signer proposes a transfer
//! let proposer = KeyPair::generate();
//! let mut tx = Transaction::new(AccountId([1; 32]), AccountId([2; 32]), 60, 1, 0);
//! tx.sign_primary(&proposer).unwrap();
//!
//! // The guard tracks it while it is in flight
//! let ledger = PendingLedger::new();
//! let hash = tx.hash();
//! ledger.insert(tx);
//! assert!(ledger.contains(&hash));
//! ```

pub mod config;
pub mod cosign;
pub mod core;
pub mod crypto;
pub mod ledger;
pub mod network;
pub mod remote;
pub mod service;

// Re-export commonly used types
pub use config::GuardConfig;
pub use cosign::{verify_primary, CoSigner};
pub use core::{AccountId, AccountSnapshot, Transaction, TxHash};
pub use crypto::KeyPair;
pub use ledger::{PendingLedger, SolvencyError};
pub use network::{Message, Server};
pub use remote::{HttpLedger, LedgerApi, RemoteError};
pub use service::Coordinator;
