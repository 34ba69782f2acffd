//! `ScribbleServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room actor.

use std::future::Future;
use std::sync::Arc;

use scribble_protocol::{Codec, JsonCodec};
use scribble_room::{Room, RoomConfig, RoomHandle, spawn_room};
use scribble_transport::{Incoming, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ScribbleError, ServerConfig, StartupProbe};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) room: RoomHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Scribble server.
///
/// ```rust,ignore
/// let server = ScribbleServerBuilder::new()
///     .bind("0.0.0.0:3001")
///     .build(TcpProbe::new("profile-store", store_addr))
///     .await?;
/// server.run().await
/// ```
pub struct ScribbleServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    seed: Option<u64>,
}

impl ScribbleServerBuilder {
    /// Creates a builder with the default [`ServerConfig`].
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            room_config: config.room,
            seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room rules and timings.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Makes drawer and word selection reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks `probe`, binds the listener and starts the room actor.
    ///
    /// # Errors
    /// - [`ScribbleError::Dependency`] if the probe fails. Nothing is bound.
    /// - [`ScribbleError::Transport`] if the address cannot be bound.
    pub async fn build(self, probe: impl StartupProbe) -> Result<ScribbleServer, ScribbleError> {
        if let Err(reason) = probe.check().await {
            tracing::error!(dependency = probe.name(), %reason, "startup dependency check failed");
            return Err(ScribbleError::Dependency {
                name: probe.name().to_string(),
                reason,
            });
        }
        tracing::debug!(dependency = probe.name(), "startup dependency check passed");

        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let room = match self.seed {
            Some(seed) => Room::with_seed(self.room_config, seed),
            None => Room::new(self.room_config),
        };
        let state = Arc::new(ServerState {
            room: spawn_room(room),
            codec: JsonCodec,
        });

        Ok(ScribbleServer { transport, state })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scribble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ScribbleServer {
    /// Creates a new builder.
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }
}

impl<C: Codec> ScribbleServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the room, for inspection.
    pub fn room(&self) -> RoomHandle {
        self.state.room.clone()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ScribbleError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then stops the room.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<(), ScribbleError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Scribble server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        // The upgrade runs on the peer's own task so a silent
                        // peer cannot hold up the listener.
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let peer = incoming.peer_addr();
                            let conn = match incoming.upgrade().await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%peer, error = %e, "upgrade failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(%peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
        }

        // The room may already be gone; shutting down is best effort.
        let _ = self.state.room.shutdown().await;
        Ok(())
    }
}
