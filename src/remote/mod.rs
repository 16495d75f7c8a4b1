//! Remote ledger collaborator
//!
//! The guard reads authoritative account state from, and submits co-signed
//! transfers to, a remote ledger service over HTTP. The `LedgerApi` trait
//! is the seam the lifecycle coordinator is generic over; tests substitute
//! an in-memory mock.

use crate::core::{AccountId, AccountSnapshot, Transaction};
use std::time::Duration;
use thiserror::Error;

/// Errors from the remote ledger service
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Account not known to the remote ledger")]
    AccountNotFound,
    #[error("Remote ledger returned HTTP {0}")]
    BadStatus(u16),
    #[error("Remote ledger request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response from remote ledger: {0}")]
    Decode(String),
}

/// Read/write access to the authoritative ledger
///
/// Both operations may block on the network and carry the configured
/// timeout; neither is ever invoked while the pending-ledger lock is held.
pub trait LedgerApi: Send + Sync {
    /// Fetch a fresh account snapshot
    fn fetch_account(
        &self,
        id: &AccountId,
    ) -> impl std::future::Future<Output = Result<AccountSnapshot, RemoteError>> + Send;

    /// Forward a co-signed transaction for broadcast
    fn submit(
        &self,
        tx: &Transaction,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// HTTP implementation of [`LedgerApi`]
///
/// Wraps `reqwest::Client` with the ledger's base URL and a bounded
/// request timeout.
#[derive(Clone)]
pub struct HttpLedger {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLedger {
    /// Create a client targeting the given base URL (e.g. `http://127.0.0.1:8001`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The configured ledger URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LedgerApi for HttpLedger {
    async fn fetch_account(&self, id: &AccountId) -> Result<AccountSnapshot, RemoteError> {
        let url = format!("{}/account/{}", self.base_url, id.to_hex());
        let response = self.http.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::AccountNotFound);
        }
        if !response.status().is_success() {
            return Err(RemoteError::BadStatus(response.status().as_u16()));
        }

        let snapshot: AccountSnapshot = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(snapshot)
    }

    async fn submit(&self, tx: &Transaction) -> Result<(), RemoteError> {
        let url = format!("{}/transaction/{}", self.base_url, tx.hash().to_hex());
        let response = self.http.post(&url).json(tx).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::BadStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
