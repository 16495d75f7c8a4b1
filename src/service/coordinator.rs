//! Lifecycle coordinator
//!
//! Orchestrates a proposal from "received" to "cleared" or "rejected":
//! fetch the authoritative account snapshot, verify the primary signature,
//! co-sign, atomically check solvency and reserve the balance, then submit
//! for broadcast. Confirmation broadcasts clear pending entries; pending
//! queries report what is currently reserved against an account.
//!
//! The coordinator owns the pending ledger and is generic over the remote
//! ledger collaborator so tests can run against an in-memory mock.

use crate::cosign::{verify_primary, CoSigner};
use crate::core::Transaction;
use crate::ledger::{PendingLedger, SolvencyError};
use crate::network::message::Message;
use crate::remote::{LedgerApi, RemoteError};
use std::sync::Arc;

/// Short rejection reason codes reported to the proposer
pub mod reason {
    pub const INVALID_SIGNATURE: &str = "invalid-signature";
    pub const NONCE_MISMATCH: &str = "nonce-mismatch";
    pub const INSUFFICIENT_FUNDS: &str = "insufficient-funds";
    pub const ACCOUNT_UNAVAILABLE: &str = "account-unavailable";
    pub const SUBMIT_FAILED: &str = "submit-failed";
}

/// Drives the per-transaction state machine for every inbound message
pub struct Coordinator<L: LedgerApi> {
    ledger: Arc<PendingLedger>,
    remote: L,
    signer: CoSigner,
    /// Park proposals whose account snapshot could not be fetched as
    /// provisional entries instead of dropping them
    park_unverified: bool,
}

impl<L: LedgerApi> Coordinator<L> {
    /// Create a coordinator owning a fresh, empty pending ledger
    pub fn new(remote: L, signer: CoSigner, park_unverified: bool) -> Self {
        Self {
            ledger: Arc::new(PendingLedger::new()),
            remote,
            signer,
            park_unverified,
        }
    }

    /// The pending ledger (shared, read-mostly outside this coordinator)
    pub fn ledger(&self) -> &Arc<PendingLedger> {
        &self.ledger
    }

    /// Handle one inbound message and produce its response.
    ///
    /// Returns `None` for messages that are not requests; the connection
    /// handler sends nothing in that case.
    pub async fn handle(&self, msg: Message) -> Option<Message> {
        match msg {
            Message::Proposal(tx) => Some(self.handle_proposal(tx).await),
            Message::Confirmation(hashes) => {
                for hash in &hashes {
                    if self.ledger.remove(hash).is_some() {
                        log::info!("Cleared confirmed transaction {}", hash);
                    } else {
                        log::debug!("Confirmation for unknown hash {} ignored", hash);
                    }
                }
                Some(Message::Ack)
            }
            Message::PendingQuery(account) => {
                let pending = self.ledger.pending_for(&account);
                log::debug!(
                    "Pending query for {}: {} committed entries",
                    account,
                    pending.len()
                );
                Some(Message::PendingList(pending))
            }
            other => {
                log::warn!("Unexpected {} message, dropping", other.type_name());
                None
            }
        }
    }

    /// Run one proposal through the authorization state machine
    async fn handle_proposal(&self, mut tx: Transaction) -> Message {
        let hash = tx.hash();
        log::info!(
            "Proposal {}: {} -> {}, amount {}, fee {}, nonce {}",
            hash,
            tx.from,
            tx.to,
            tx.amount,
            tx.fee,
            tx.nonce
        );

        // Authoritative state, fetched fresh for every decision. No ledger
        // lock is held here.
        let snapshot = match self.remote.fetch_account(&tx.from).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Proposal {}: account fetch failed: {}", hash, e);
                if self.park_unverified && matches!(e, RemoteError::AccountNotFound) {
                    if let Some(stale) = self.ledger.park(tx) {
                        log::info!(
                            "Proposal {} parked, superseded stale proposal {}",
                            hash,
                            stale.hash()
                        );
                    } else {
                        log::info!("Proposal {} parked awaiting account data", hash);
                    }
                }
                return rejected(reason::ACCOUNT_UNAVAILABLE);
            }
        };

        // Sequencing is checked before the signature so a proposal that is
        // both out of order and badly signed reports the sequencing
        // failure. The atomic reserve step below re-checks it.
        if snapshot.nonce != tx.nonce {
            log::info!(
                "Proposal {}: rejected: account expects nonce {}, transaction carries {}",
                hash,
                snapshot.nonce,
                tx.nonce
            );
            return rejected(reason::NONCE_MISMATCH);
        }

        if let Err(e) = verify_primary(&tx, &snapshot.public_key) {
            log::warn!("Proposal {}: rejected: {}", hash, e);
            return rejected(reason::INVALID_SIGNATURE);
        }

        if let Err(e) = self.signer.cosign(&mut tx) {
            // Key material is immutable and was validated at startup, so
            // this is effectively unreachable; refuse rather than panic.
            log::error!("Proposal {}: co-signing failed: {}", hash, e);
            return rejected(reason::INVALID_SIGNATURE);
        }

        // Solvency check and reservation are one atomic step against
        // concurrent proposals from the same account.
        if let Err(e) = self.ledger.reserve(tx.clone(), &snapshot) {
            log::info!("Proposal {}: rejected: {}", hash, e);
            return match e {
                SolvencyError::NonceMismatch { .. } => rejected(reason::NONCE_MISMATCH),
                SolvencyError::InsufficientFunds { .. } => {
                    rejected(reason::INSUFFICIENT_FUNDS)
                }
            };
        }

        // Reservation must not outlive a transaction that was never
        // broadcast: roll it back if the submit fails.
        if let Err(e) = self.remote.submit(&tx).await {
            log::warn!("Proposal {}: submission failed, rolling back: {}", hash, e);
            self.ledger.remove(&hash);
            return rejected(reason::SUBMIT_FAILED);
        }

        log::info!("Proposal {} co-signed and submitted", hash);
        Message::Ack
    }
}

fn rejected(reason: &str) -> Message {
    Message::Rejected {
        reason: reason.to_string(),
    }
}
