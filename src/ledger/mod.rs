//! Pending-transaction ledger and solvency engine

pub mod pending;
pub mod solvency;

pub use pending::{PendingEntry, PendingLedger};
pub use solvency::{check_solvency, project_balance, SolvencyError};
