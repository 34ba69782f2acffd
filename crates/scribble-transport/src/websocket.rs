//! WebSocket listener on top of `tokio-tungstenite`.
//!
//! Each socket is split after the upgrade. The write half and the read
//! half sit behind separate locks so a parked `recv` never holds up
//! outbound events.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Incoming, Transport, TransportError};

/// How long a peer gets to finish the upgrade before it is dropped.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<TcpStream>;

/// Listens for browsers and upgrades them to WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "listening for websocket peers");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Incoming = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<PendingWebSocket, TransportError> {
        let (stream, peer) = self.listener.accept().await?;
        tracing::trace!(%peer, "tcp peer accepted");
        Ok(PendingWebSocket { stream, peer })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP peer that has not sent its upgrade request yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Incoming for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn upgrade(self) -> Result<WebSocketConnection, TransportError> {
        let peer = self.peer;
        let socket = tokio::time::timeout(HANDSHAKE_TIMEOUT, tokio_tungstenite::accept_async(self.stream))
            .await
            .map_err(|_| TransportError::HandshakeTimeout { peer })?
            .map_err(TransportError::Handshake)?;

        let id = ConnectionId::next();
        tracing::debug!(%id, %peer, "websocket upgraded");

        let (writer, reader) = socket.split();
        Ok(WebSocketConnection {
            id,
            peer,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }
}

/// An upgraded peer.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<SplitSink<Socket, Message>>,
    reader: Mutex<SplitStream<Socket>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let message = match std::str::from_utf8(frame) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(frame.to_vec()),
        };
        self.writer.lock().await.send(message).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        while let Some(message) = reader.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(data) => return Ok(Some(data.to_vec())),
                Message::Close(_) => return Ok(None),
                // tungstenite answers pings on its own
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer.lock().await.close().await?;
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
