use std::io;

/// Errors raised while listening for or talking to a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[from] io::Error),

    /// The peer connected but never completed the WebSocket upgrade.
    #[error("handshake with {peer} did not finish in time")]
    HandshakeTimeout { peer: std::net::SocketAddr },

    /// The WebSocket upgrade was rejected.
    #[cfg(feature = "websocket")]
    #[error("handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    /// Reading or writing a frame failed after the upgrade.
    #[cfg(feature = "websocket")]
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}
