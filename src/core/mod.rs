//! Core data model: accounts and two-signature transactions

pub mod account;
pub mod transaction;

pub use account::{AccountId, AccountSnapshot};
pub use transaction::{Transaction, TransactionError, TxHash};
