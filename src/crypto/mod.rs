//! Cryptographic primitives: hashing and ECDSA keys

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_array, sha256_hex};
pub use keys::{public_key_from_hex, sign_message, verify_signature, KeyError, KeyPair};
