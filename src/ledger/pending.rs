//! Pending-transaction ledger
//!
//! The concurrent, mutable record of transfers that have been seen but not
//! yet confirmed on the remote ledger, keyed by content hash. Entries fall
//! into two kinds: *committed* entries carry the service's co-signature and
//! count toward solvency math; *provisional* entries were parked before
//! authorization could complete and reserve nothing.
//!
//! Every operation takes the internal lock for its full duration, so a
//! snapshot never observes a half-applied insert or removal. The lock is
//! never held across I/O; callers copy out what they need and release
//! before touching the network.

use crate::core::{AccountId, AccountSnapshot, Transaction, TxHash};
use crate::ledger::solvency::{check_solvency, SolvencyError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Entry in the pending ledger with arrival metadata
#[derive(Debug, Clone)]
pub struct PendingEntry {
    /// The in-flight transaction
    pub tx: Transaction,
    /// When the entry was recorded (Unix timestamp)
    pub added_time: u64,
}

impl PendingEntry {
    fn new(tx: Transaction) -> Self {
        Self {
            tx,
            added_time: chrono::Utc::now().timestamp() as u64,
        }
    }

    /// Committed entries carry the co-signature and reserve balance
    pub fn is_committed(&self) -> bool {
        self.tx.is_cosigned()
    }
}

/// In-memory store of in-flight transactions, guarded by a single mutex
///
/// Process-scoped soft state: empty at startup, discarded at shutdown.
/// In-flight authorizations are recoverable by re-request.
#[derive(Debug, Default)]
pub struct PendingLedger {
    entries: Mutex<HashMap<TxHash, PendingEntry>>,
}

impl PendingLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record a transaction, idempotent by content hash
    ///
    /// Re-inserting a hash that is already present replaces the entry in
    /// place; two transactions with the same hash are the same logical
    /// transaction and never produce two entries.
    pub fn insert(&self, tx: Transaction) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(tx.hash(), PendingEntry::new(tx));
    }

    /// Remove an entry by hash; a no-op for unknown hashes
    pub fn remove(&self, hash: &TxHash) -> Option<Transaction> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(hash).map(|e| e.tx)
    }

    /// Evict at most one provisional (not yet co-signed) entry addressed to
    /// `recipient`, used when a newer attempt to the same recipient arrives
    pub fn remove_stale_to(&self, recipient: &AccountId) -> Option<Transaction> {
        let mut entries = self.entries.lock().unwrap();
        Self::evict_stale_locked(&mut entries, recipient)
    }

    /// Park a transaction provisionally, superseding at most one stale
    /// provisional entry to the same recipient in the same atomic step
    pub fn park(&self, tx: Transaction) -> Option<Transaction> {
        let mut entries = self.entries.lock().unwrap();
        let evicted = Self::evict_stale_locked(&mut entries, &tx.to);
        entries.insert(tx.hash(), PendingEntry::new(tx));
        evicted
    }

    fn evict_stale_locked(
        entries: &mut HashMap<TxHash, PendingEntry>,
        recipient: &AccountId,
    ) -> Option<Transaction> {
        let stale = entries
            .iter()
            .find(|(_, e)| !e.is_committed() && e.tx.to == *recipient)
            .map(|(hash, _)| *hash)?;
        entries.remove(&stale).map(|e| e.tx)
    }

    /// Atomically check solvency for `tx` and, on success, record it as a
    /// committed entry
    ///
    /// This is the single critical section that prevents two concurrent
    /// proposals from the same account from both being accepted against the
    /// same finite balance: the projection over committed entries and the
    /// insertion of the new reservation happen under one lock acquisition.
    /// The caller must have attached the co-signature already.
    pub fn reserve(
        &self,
        tx: Transaction,
        snapshot: &AccountSnapshot,
    ) -> Result<(), SolvencyError> {
        debug_assert!(tx.is_cosigned());
        let mut entries = self.entries.lock().unwrap();

        let hash = tx.hash();
        check_solvency(
            &tx,
            snapshot,
            entries
                .iter()
                .filter(|(h, e)| e.is_committed() && **h != hash)
                .map(|(_, e)| &e.tx),
        )?;

        entries.insert(hash, PendingEntry::new(tx));
        Ok(())
    }

    /// Copy out every transaction matching `predicate`
    pub fn snapshot<F>(&self, predicate: F) -> Vec<Transaction>
    where
        F: Fn(&PendingEntry) -> bool,
    {
        let entries = self.entries.lock().unwrap();
        entries
            .values()
            .filter(|e| predicate(e))
            .map(|e| e.tx.clone())
            .collect()
    }

    /// Committed entries where `account` is sender or recipient
    pub fn pending_for(&self, account: &AccountId) -> Vec<Transaction> {
        self.snapshot(|e| e.is_committed() && (e.tx.from == *account || e.tx.to == *account))
    }

    /// Whether an entry with this hash exists
    pub fn contains(&self, hash: &TxHash) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.contains_key(hash)
    }

    /// Number of entries (committed and provisional)
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> AccountId {
        AccountId([byte; 32])
    }

    fn cosigned(from: AccountId, to: AccountId, amount: u64, nonce: u32) -> Transaction {
        let mut tx = Transaction::new(from, to, amount, 0, nonce);
        tx.cosig = "ab".repeat(64);
        tx
    }

    fn snapshot(balance: u64, nonce: u32) -> AccountSnapshot {
        AccountSnapshot {
            balance,
            nonce,
            is_root: false,
            public_key: String::new(),
        }
    }

    #[test]
    fn test_insert_is_idempotent_by_hash() {
        let ledger = PendingLedger::new();
        let tx = cosigned(account(1), account(2), 10, 0);

        ledger.insert(tx.clone());
        ledger.insert(tx);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let ledger = PendingLedger::new();
        let tx = cosigned(account(1), account(2), 10, 0);
        let hash = tx.hash();

        ledger.insert(tx);
        assert!(ledger.remove(&hash).is_some());
        assert!(ledger.remove(&hash).is_none());
        assert!(ledger.remove(&TxHash([9u8; 32])).is_none());
    }

    #[test]
    fn test_reserve_records_committed_entry() {
        let ledger = PendingLedger::new();
        let tx = cosigned(account(1), account(2), 60, 0);
        let hash = tx.hash();

        ledger.reserve(tx, &snapshot(100, 0)).unwrap();
        assert!(ledger.contains(&hash));
    }

    #[test]
    fn test_reserve_rejects_against_reserved_balance() {
        let ledger = PendingLedger::new();
        ledger
            .reserve(cosigned(account(1), account(2), 60, 0), &snapshot(100, 0))
            .unwrap();

        // 100 - 60 reserved = 40 projected, not enough for 50
        let err = ledger
            .reserve(cosigned(account(1), account(2), 50, 1), &snapshot(100, 1))
            .unwrap_err();
        assert_eq!(
            err,
            SolvencyError::InsufficientFunds {
                projected: 40,
                needed: 50
            }
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_reserve_credits_incoming_committed() {
        let ledger = PendingLedger::new();
        ledger.insert(cosigned(account(3), account(1), 30, 0));

        // 10 authoritative + 30 promised in = 40 projected
        ledger
            .reserve(cosigned(account(1), account(2), 40, 0), &snapshot(10, 0))
            .unwrap();
    }

    #[test]
    fn test_provisional_entries_reserve_nothing() {
        let ledger = PendingLedger::new();
        ledger.insert(Transaction::new(account(1), account(2), 90, 0, 0));

        // The provisional 90 must not count against the balance.
        ledger
            .reserve(cosigned(account(1), account(3), 100, 0), &snapshot(100, 0))
            .unwrap();
    }

    #[test]
    fn test_remove_stale_to_skips_committed() {
        let ledger = PendingLedger::new();
        ledger.insert(cosigned(account(1), account(2), 10, 0));

        assert!(ledger.remove_stale_to(&account(2)).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_remove_stale_to_evicts_at_most_one() {
        let ledger = PendingLedger::new();
        ledger.insert(Transaction::new(account(1), account(2), 10, 0, 0));
        ledger.insert(Transaction::new(account(3), account(2), 20, 0, 0));

        assert!(ledger.remove_stale_to(&account(2)).is_some());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_park_supersedes_stale_provisional() {
        let ledger = PendingLedger::new();
        let old = Transaction::new(account(1), account(2), 10, 0, 0);
        ledger.insert(old.clone());

        let newer = Transaction::new(account(3), account(2), 20, 0, 0);
        let evicted = ledger.park(newer.clone());

        assert_eq!(evicted, Some(old));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(&newer.hash()));
    }

    #[test]
    fn test_pending_for_matches_sender_and_recipient() {
        let ledger = PendingLedger::new();
        ledger.insert(cosigned(account(1), account(2), 10, 0));
        ledger.insert(cosigned(account(2), account(3), 20, 0));
        ledger.insert(cosigned(account(4), account(5), 30, 0));
        // provisional entries are not reported
        ledger.insert(Transaction::new(account(2), account(6), 40, 0, 0));

        let pending = ledger.pending_for(&account(2));
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_snapshot_filters() {
        let ledger = PendingLedger::new();
        ledger.insert(cosigned(account(1), account(2), 10, 0));
        ledger.insert(Transaction::new(account(1), account(3), 20, 0, 1));

        assert_eq!(ledger.snapshot(|e| e.is_committed()).len(), 1);
        assert_eq!(ledger.snapshot(|_| true).len(), 2);
    }
}
