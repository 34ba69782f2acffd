//! Transport layer for Scribble.
//!
//! The room never sees sockets. New peers arrive through a [`Transport`]
//! and are then driven through the [`Connection`] trait. Each connection
//! is stamped with a [`ConnectionId`] that is never reused while the
//! process runs; the server uses it as the player's identity.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket listener built on `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection number. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Hands out the next unused id.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of new connections.
///
/// Accepting is split in two so a slow peer never holds up the listener:
/// [`accept`](Transport::accept) only takes the next raw peer, and the
/// protocol upgrade runs later through [`Incoming::upgrade`], usually on
/// the peer's own task.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Incoming: Incoming<Connection = Self::Connection, Error = Self::Error>;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Does not talk to it.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A peer that has connected but not yet completed the upgrade.
pub trait Incoming: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    fn peer_addr(&self) -> SocketAddr;

    /// Completes the upgrade, or gives up after a bounded wait.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// One peer, carrying whole frames in both directions.
///
/// `send` and `recv` take `&self` and must not exclude each other: the
/// server parks one task in [`recv`](Connection::recv) while a writer
/// task keeps calling [`send`](Connection::send).
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame. UTF-8 payloads go out as text frames.
    async fn send(&self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Next data frame, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_ids_are_increasing_and_distinct() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert!(b > a);
        assert!(a.into_inner() >= 1);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::next();
        assert_eq!(id.to_string(), format!("conn-{}", id.into_inner()));
    }
}
