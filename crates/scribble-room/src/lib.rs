//! The Scribble game room.
//!
//! One room runs as an isolated Tokio task (actor model). The task owns
//! the roster, the canvas, the round phase and the phase timer, and
//! processes every inbound event and every tick one at a time.
//!
//! # Key types
//!
//! - [`Room`]: the round state machine; pure, synchronous, testable
//! - [`Canvas`]: the shared pixel buffer
//! - [`ScoreBoard`]: guess evaluation and scoring
//! - [`BroadcastPort`] / [`ConnectionHub`]: fan-out to connections
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: timings, canvas size, points and vocabulary

mod actor;
mod canvas;
mod config;
mod error;
mod hub;
mod room;
mod scoring;

pub use actor::{ROOM_QUEUE_CAPACITY, RoomHandle, spawn_room};
pub use canvas::Canvas;
pub use config::{DEFAULT_WORDS, RoomConfig};
pub use error::RoomError;
pub use hub::{BroadcastPort, ConnectionHub, OUTBOUND_QUEUE_CAPACITY, PlayerSender, dispatch};
pub use room::{Outbound, Room, RoomInfo};
pub use scoring::{ScoreBoard, Verdict};
