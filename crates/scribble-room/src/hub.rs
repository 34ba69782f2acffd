//! Fan-out of room events to connections.
//!
//! The room decides *who* gets an event; a [`BroadcastPort`] does the
//! delivering. [`ConnectionHub`] is the production port: one bounded
//! channel per connection, fed only by the room actor and drained by that
//! connection's writer task, so every connection sees events in the order
//! the room produced them.
//!
//! The room never waits on a connection. A connection whose queue is
//! full has stopped reading; the hub drops its channel, which ends the
//! connection's writer and, with it, the connection.

use std::collections::HashMap;

use scribble_protocol::{PlayerId, Recipient, ServerEvent};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::Outbound;

/// Events a connection may have queued before it is considered stalled.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 512;

/// Channel sender for delivering outbound events to one connection.
///
/// Create it with [`mpsc::channel`]`(`[`OUTBOUND_QUEUE_CAPACITY`]`)`.
pub type PlayerSender = mpsc::Sender<ServerEvent>;

/// Where the room's outbound events go.
pub trait BroadcastPort {
    /// Delivers to every attached connection, optionally skipping one.
    fn broadcast_all(&mut self, event: &ServerEvent, except: Option<PlayerId>);

    /// Delivers to a single connection.
    fn unicast(&mut self, to: PlayerId, event: &ServerEvent);
}

/// Routes each `(Recipient, ServerEvent)` pair to the right port call.
pub fn dispatch<P: BroadcastPort + ?Sized>(port: &mut P, outbound: Outbound) {
    for (recipient, event) in outbound {
        match recipient {
            Recipient::All => port.broadcast_all(&event, None),
            Recipient::AllExcept(excluded) => port.broadcast_all(&event, Some(excluded)),
            Recipient::Player(to) => port.unicast(to, &event),
        }
    }
}

/// The attached connections and their outbound channels.
///
/// Connections are attached when they open, before (and regardless of
/// whether) they join as players, so watchers see the game too.
#[derive(Debug, Default)]
pub struct ConnectionHub {
    senders: HashMap<PlayerId, PlayerSender>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's channel. Replaces any previous channel
    /// for the same id.
    pub fn attach(&mut self, id: PlayerId, sender: PlayerSender) {
        if self.senders.insert(id, sender).is_some() {
            tracing::warn!(connection = %id, "connection attached twice, replacing channel");
        }
    }

    /// Forgets a connection. Returns `false` if it was not attached
    /// (never attached, already detached, or dropped for stalling).
    pub fn detach(&mut self, id: PlayerId) -> bool {
        self.senders.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Queues `event` for `id`. Returns `false` if the queue is full.
    ///
    /// A closed channel counts as delivered: the connection is going
    /// away and its detach is already queued.
    fn offer(sender: &PlayerSender, event: &ServerEvent) -> bool {
        !matches!(sender.try_send(event.clone()), Err(TrySendError::Full(_)))
    }

    fn drop_stalled(&mut self, id: PlayerId) {
        if self.senders.remove(&id).is_some() {
            tracing::warn!(
                connection = %id,
                capacity = OUTBOUND_QUEUE_CAPACITY,
                "outbound queue full, dropping connection"
            );
        }
    }
}

impl BroadcastPort for ConnectionHub {
    fn broadcast_all(&mut self, event: &ServerEvent, except: Option<PlayerId>) {
        let stalled: Vec<PlayerId> = self
            .senders
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter(|(_, sender)| !Self::offer(sender, event))
            .map(|(id, _)| *id)
            .collect();
        for id in stalled {
            self.drop_stalled(id);
        }
    }

    fn unicast(&mut self, to: PlayerId, event: &ServerEvent) {
        let delivered = self
            .senders
            .get(&to)
            .is_none_or(|sender| Self::offer(sender, event));
        if !delivered {
            self.drop_stalled(to);
        }
    }
}
