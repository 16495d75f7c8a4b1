//! Wire messages, framing codec, and the TCP server

pub mod message;
pub mod server;

pub use message::{Message, MAGIC};
pub use server::{handle_connection, MessageCodec, Server};
