//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler:
//!
//! 1. Attach an outbound channel to the room; the room sends a snapshot.
//! 2. Spawn a writer task that drains the channel into the socket, so
//!    this connection sees events in the order the room produced them.
//! 3. Loop: receive frames → decode and validate → submit to the room.
//!    Frames that fail get an `error` event back; the connection stays open.
//! 4. On close, or once the room drops a connection that stopped
//!    reading, detach from the room (the player leaves).

use std::sync::Arc;

use scribble_protocol::{ClientEvent, Codec, PlayerId, ProtocolError, ServerEvent};
use scribble_room::{OUTBOUND_QUEUE_CAPACITY, RoomHandle};
use scribble_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc::{self, WeakSender};

use crate::ScribbleError;
use crate::server::ServerState;

/// Drop guard that detaches the connection from the room when the
/// handler exits, whichever way it exits.
///
/// `Drop` is synchronous, so the detach is sent from a spawned task.
struct DetachGuard {
    player: PlayerId,
    room: RoomHandle,
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        let player = self.player;
        let room = self.room.clone();
        tokio::spawn(async move {
            let _ = room.detach(player).await;
        });
    }
}

/// Decodes one frame and checks the parts of it that need no room state.
fn decode_event<C: Codec>(codec: &C, data: &[u8]) -> Result<ClientEvent, ProtocolError> {
    let event: ClientEvent = codec.decode(data)?;
    event.validate()?;
    Ok(event)
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScribbleError> {
    let conn = Arc::new(conn);
    // The connection id doubles as the player identity.
    let player = PlayerId(conn.id().into_inner());
    tracing::debug!(%player, peer = %conn.peer_addr(), "handling new connection");

    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    // Only the room holds the strong sender. If the room drops it because
    // this peer stopped reading, the writer ends and so does the handler.
    let errors = tx.downgrade();
    state.room.attach(player, tx).await?;
    let _guard = DetachGuard {
        player,
        room: state.room.clone(),
    };

    let mut writer = tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));
    let result = tokio::select! {
        result = read_loop(&conn, &state, player, &errors) => result,
        _ = &mut writer => {
            tracing::info!(%player, "outbound queue closed, dropping connection");
            Ok(())
        }
    };

    writer.abort();
    let _ = conn.close().await;
    result
}

async fn read_loop<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player: PlayerId,
    errors: &WeakSender<ServerEvent>,
) -> Result<(), ScribbleError> {
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player, "connection closed");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "recv error");
                return Err(e.into());
            }
        };

        match decode_event(&state.codec, &data) {
            Ok(event) => {
                tracing::trace!(%player, event = event.kind(), "event received");
                state.room.submit(player, event).await?;
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "rejected frame");
                if let Some(errors) = errors.upgrade() {
                    let _ = errors.try_send(ServerEvent::error(e.to_string()));
                }
            }
        }
    }
}

async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::Receiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(connection = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
