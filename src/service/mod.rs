//! Lifecycle coordination for inbound messages

pub mod coordinator;

pub use coordinator::{reason, Coordinator};
