//! TCP server and connection handling
//!
//! Accepts inbound connections and runs a framed request/response loop per
//! connection. One task is spawned per connection; closing a connection
//! aborts only that connection's response delivery and never touches the
//! pending ledger.

use crate::network::message::{Message, MAGIC};
use crate::remote::LedgerApi;
use crate::service::Coordinator;
use bytes::{Buf, BufMut, BytesMut};
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Decoder, Encoder, Framed};

/// Message codec for length-prefixed framing
pub struct MessageCodec;

impl Encoder<Message> for MessageCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let data = item
            .to_bytes()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        // Magic (4) + Length (4) + Data
        dst.reserve(8 + data.len());
        dst.put_slice(&MAGIC);
        dst.put_u32(data.len() as u32);
        dst.put_slice(&data);

        Ok(())
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Need at least header
        if src.len() < 8 {
            return Ok(None);
        }

        // Check magic
        if src[..4] != MAGIC {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid magic bytes",
            ));
        }

        // Get length
        let len = u32::from_be_bytes([src[4], src[5], src[6], src[7]]) as usize;

        // Check if we have full message
        if src.len() < 8 + len {
            return Ok(None);
        }

        // Skip header
        src.advance(8);

        // Extract message data
        let data = src.split_to(len);

        // Deserialize
        let msg = Message::from_bytes(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        Ok(Some(msg))
    }
}

/// TCP server for accepting guard connections
pub struct Server {
    listener: TcpListener,
    port: u16,
}

impl Server {
    /// Bind to an address and create the server
    pub async fn bind(addr: &str) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();
        log::info!("Guard listening on {}", addr);

        Ok(Self { listener, port })
    }

    /// Get the listening port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept connections forever, spawning one handler task each
    pub async fn run<L>(self, coordinator: Arc<Coordinator<L>>) -> Result<(), std::io::Error>
    where
        L: LedgerApi + 'static,
    {
        loop {
            // Transient accept errors (e.g. EMFILE, ECONNABORTED under
            // connection pressure) must not take the guard down with the
            // pending ledger in it.
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, coordinator).await {
                    log::debug!("Connection {} closed: {}", addr, e);
                }
            });
        }
    }
}

/// Serve one connection: read framed requests, answer each in turn
///
/// A malformed frame terminates the connection with no response; the
/// pending ledger is never mutated on disconnect.
pub async fn handle_connection<L>(
    stream: TcpStream,
    addr: SocketAddr,
    coordinator: Arc<Coordinator<L>>,
) -> Result<(), std::io::Error>
where
    L: LedgerApi,
{
    let framed = Framed::new(stream, MessageCodec);
    let (mut writer, mut reader) = framed.split();

    while let Some(next) = reader.next().await {
        let msg = match next {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Dropping connection {}: {}", addr, e);
                break;
            }
        };

        log::debug!("Received {} from {}", msg.type_name(), addr);
        if let Some(response) = coordinator.handle(msg).await {
            if writer.send(response).await.is_err() {
                break;
            }
        }
    }

    Ok(())
}
