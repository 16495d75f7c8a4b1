//! Signature verification and co-signing

pub mod signer;
pub mod verifier;

pub use signer::CoSigner;
pub use verifier::{verify_primary, VerifyError};
