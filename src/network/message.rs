//! Wire messages consumed and produced by the guard
//!
//! Three request kinds arrive from peers; each is answered with exactly
//! one response. Payloads are serde_json, framed by the codec in
//! [`crate::network::server`].

use crate::core::{AccountId, Transaction, TxHash};
use serde::{Deserialize, Serialize};

/// Magic bytes for message framing
pub const MAGIC: [u8; 4] = [0x43, 0x53, 0x47, 0x31]; // "CSG1"

/// Network message types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Message {
    /// A transfer proposal carrying the primary signature, awaiting
    /// co-signature
    Proposal(Transaction),

    /// Hashes of transactions finalized on the ledger; matching pending
    /// entries are cleared
    Confirmation(Vec<TxHash>),

    /// Ask which committed transfers currently touch an account
    PendingQuery(AccountId),

    /// Positive acknowledgement
    Ack,

    /// The proposal was not authorized; `reason` is a short code
    Rejected { reason: String },

    /// Committed transfers where the queried account is sender or
    /// recipient (possibly empty)
    PendingList(Vec<Transaction>),
}

impl Message {
    /// Serialize message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Get message type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Proposal(_) => "Proposal",
            Message::Confirmation(_) => "Confirmation",
            Message::PendingQuery(_) => "PendingQuery",
            Message::Ack => "Ack",
            Message::Rejected { .. } => "Rejected",
            Message::PendingList(_) => "PendingList",
        }
    }
}
