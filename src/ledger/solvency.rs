//! Solvency projection against the pending ledger
//!
//! Decides whether a proposed transfer is affordable given the account's
//! authoritative balance and every transfer already promised but not yet
//! confirmed. Committed (co-signed) entries reserve outgoing funds and
//! optimistically credit incoming ones; an in-flight incoming transfer may
//! well complete before this one is needed, so crediting it favors
//! liveness over strict conservatism.

use crate::core::{AccountId, AccountSnapshot, Transaction};
use thiserror::Error;

/// Authorization failures produced by the solvency check
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SolvencyError {
    #[error("Nonce mismatch: account expects {expected}, transaction carries {got}")]
    NonceMismatch { expected: u32, got: u32 },
    #[error("Insufficient funds: projected balance {projected}, needed {needed}")]
    InsufficientFunds { projected: u64, needed: u64 },
}

/// Project the spendable balance of `account` given the committed entries.
///
/// Every committed outgoing transfer subtracts its full debit; every
/// committed incoming transfer adds its amount. The accumulator is signed
/// so an over-promised account clamps to zero instead of wrapping.
pub fn project_balance<'a, I>(account: &AccountId, balance: u64, committed: I) -> u64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut projected = balance as i128;
    for tx in committed {
        if tx.from == *account {
            projected -= tx.total_debit() as i128;
        }
        if tx.to == *account {
            projected += tx.amount as i128;
        }
    }
    projected.clamp(0, u64::MAX as i128) as u64
}

/// Check whether `tx` is affordable for its sender.
///
/// The nonce is enforced for every account, root included; the balance
/// projection is skipped for root accounts only.
pub fn check_solvency<'a, I>(
    tx: &Transaction,
    snapshot: &AccountSnapshot,
    committed: I,
) -> Result<(), SolvencyError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if snapshot.nonce != tx.nonce {
        return Err(SolvencyError::NonceMismatch {
            expected: snapshot.nonce,
            got: tx.nonce,
        });
    }

    if snapshot.is_root {
        return Ok(());
    }

    let projected = project_balance(&tx.from, snapshot.balance, committed);
    let needed = tx.total_debit();
    if projected < needed {
        return Err(SolvencyError::InsufficientFunds { projected, needed });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> AccountId {
        AccountId([byte; 32])
    }

    fn snapshot(balance: u64, nonce: u32, is_root: bool) -> AccountSnapshot {
        AccountSnapshot {
            balance,
            nonce,
            is_root,
            public_key: String::new(),
        }
    }

    fn committed_tx(from: AccountId, to: AccountId, amount: u64, fee: u64) -> Transaction {
        let mut tx = Transaction::new(from, to, amount, fee, 0);
        tx.cosig = "aa".repeat(64);
        tx
    }

    #[test]
    fn test_accepts_within_balance() {
        let tx = Transaction::new(account(1), account(2), 60, 0, 0);
        assert!(check_solvency(&tx, &snapshot(100, 0, false), []).is_ok());
    }

    #[test]
    fn test_conservation_boundary_exact() {
        // balance 100, 60 reserved out, 30 promised in: spendable is 70
        let reserved = [
            committed_tx(account(1), account(2), 60, 0),
            committed_tx(account(3), account(1), 30, 0),
        ];

        let at_boundary = Transaction::new(account(1), account(2), 70, 0, 0);
        assert!(check_solvency(&at_boundary, &snapshot(100, 0, false), &reserved).is_ok());

        let one_over = Transaction::new(account(1), account(2), 71, 0, 0);
        assert_eq!(
            check_solvency(&one_over, &snapshot(100, 0, false), &reserved),
            Err(SolvencyError::InsufficientFunds {
                projected: 70,
                needed: 71
            })
        );
    }

    #[test]
    fn test_fee_counts_toward_debit() {
        let tx = Transaction::new(account(1), account(2), 100, 1, 0);
        assert_eq!(
            check_solvency(&tx, &snapshot(100, 0, false), []),
            Err(SolvencyError::InsufficientFunds {
                projected: 100,
                needed: 101
            })
        );
    }

    #[test]
    fn test_root_skips_balance_check() {
        let tx = Transaction::new(account(1), account(2), 1_000_000, 0, 0);
        assert!(check_solvency(&tx, &snapshot(0, 0, true), []).is_ok());
    }

    #[test]
    fn test_root_still_enforces_nonce() {
        let tx = Transaction::new(account(1), account(2), 1, 0, 5);
        assert_eq!(
            check_solvency(&tx, &snapshot(0, 0, true), []),
            Err(SolvencyError::NonceMismatch {
                expected: 0,
                got: 5
            })
        );
    }

    #[test]
    fn test_nonce_mismatch_independent_of_balance() {
        let tx = Transaction::new(account(1), account(2), 1, 0, 3);
        assert_eq!(
            check_solvency(&tx, &snapshot(1_000_000, 2, false), []),
            Err(SolvencyError::NonceMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_over_promised_account_clamps_to_zero() {
        // Reserved debits exceed the authoritative balance; the projection
        // must clamp instead of wrapping around.
        let reserved = [
            committed_tx(account(1), account(2), 80, 0),
            committed_tx(account(1), account(3), 80, 0),
        ];
        assert_eq!(project_balance(&account(1), 100, &reserved), 0);
    }
}
