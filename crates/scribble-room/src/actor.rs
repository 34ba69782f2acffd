//! Room actor: the Tokio task that owns the [`Room`].
//!
//! All state lives inside one task and the outside world talks to it
//! through an mpsc channel. Commands and timer ticks are handled one at a
//! time, so no two events ever observe each other half-applied.

use scribble_protocol::{ClientEvent, PlayerId};
use tokio::sync::{mpsc, oneshot};

use crate::{BroadcastPort, ConnectionHub, PlayerSender, Room, RoomError, RoomInfo, dispatch};

/// Capacity of a room's command queue. Senders wait when it is full.
pub const ROOM_QUEUE_CAPACITY: usize = 1024;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// A connection opened. It starts receiving broadcasts and gets a
    /// snapshot of the room.
    Attach { player: PlayerId, sender: PlayerSender },

    /// A connection closed. The player (if they joined) leaves.
    Detach { player: PlayerId },

    /// An event decoded from a connection.
    Event { sender: PlayerId, event: ClientEvent },

    /// Request the current room metadata.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the actor.
    Shutdown,
}

/// Why the actor woke up.
enum Wake {
    Command(RoomCommand),
    Tick,
    Closed,
}

/// Handle to a running room actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| RoomError::Unavailable)
    }

    /// Attaches a connection's outbound channel.
    pub async fn attach(&self, player: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        self.send(RoomCommand::Attach { player, sender }).await
    }

    /// Detaches a connection; the player leaves the roster.
    pub async fn detach(&self, player: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::Detach { player }).await
    }

    /// Queues an inbound event (fire-and-forget).
    pub async fn submit(&self, sender: PlayerId, event: ClientEvent) -> Result<(), RoomError> {
        self.send(RoomCommand::Event { sender, event }).await
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }
}

struct RoomActor {
    room: Room,
    hub: ConnectionHub,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!("room actor started");

        loop {
            let wake = tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => Wake::Command(cmd),
                    None => Wake::Closed,
                },
                info = self.room.timer_mut().wait_for_tick() => {
                    if info.ticks_skipped > 0 {
                        tracing::warn!(skipped = info.ticks_skipped, "room fell behind its timer");
                    }
                    Wake::Tick
                }
            };

            match wake {
                Wake::Command(RoomCommand::Attach { player, sender }) => {
                    self.hub.attach(player, sender);
                    for event in self.room.welcome() {
                        self.hub.unicast(player, &event);
                    }
                    tracing::debug!(connection = %player, connections = self.hub.len(), "connection attached");
                }
                Wake::Command(RoomCommand::Detach { player }) => {
                    self.hub.detach(player);
                    let out = self.room.leave(player);
                    dispatch(&mut self.hub, out);
                    tracing::debug!(connection = %player, connections = self.hub.len(), "connection detached");
                }
                Wake::Command(RoomCommand::Event { sender, event }) => {
                    let out = self.room.handle(sender, event);
                    dispatch(&mut self.hub, out);
                }
                Wake::Command(RoomCommand::GetInfo { reply }) => {
                    let _ = reply.send(self.room.info());
                }
                Wake::Command(RoomCommand::Shutdown) => {
                    tracing::info!("room shutting down");
                    break;
                }
                Wake::Tick => {
                    let out = self.room.tick();
                    dispatch(&mut self.hub, out);
                }
                Wake::Closed => break,
            }
        }

        let totals = self.room.timer_mut().metrics();
        tracing::info!(
            ticks = totals.total_ticks,
            late_ticks = totals.total_overruns,
            "room actor stopped"
        );
    }
}

/// Spawns the room actor task and returns a handle to it.
pub fn spawn_room(room: Room) -> RoomHandle {
    let (tx, rx) = mpsc::channel(ROOM_QUEUE_CAPACITY);

    let actor = RoomActor {
        room,
        hub: ConnectionHub::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { sender: tx }
}
