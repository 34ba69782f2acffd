//! Wire protocol for Scribble.
//!
//! - **Types** ([`PlayerId`], [`Phase`], [`Color`], ...) shared by the
//!   room and the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) that travel on the wire.
//! - **Codec** ([`Codec`], [`JsonCodec`]) turning events into frames.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Room (game state)
//! ```

mod codec;
mod color;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use color::Color;
pub use error::ProtocolError;
pub use event::{ClientEvent, MAX_GUESS_LEN, ServerEvent};
pub use types::{Phase, PlayerId, PlayerSummary, Readiness, Recipient};
