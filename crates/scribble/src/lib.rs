//! # Scribble
//!
//! Game server for a single shared drawing-and-guessing room.
//!
//! Players connect over WebSocket, join under a username, mark themselves
//! ready, and once everyone is ready a countdown starts a round: one
//! player draws a secret word on a shared canvas while the others guess.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn run() -> Result<(), ScribbleError> {
//! scribble::init_tracing("info");
//! let server = ScribbleServerBuilder::new()
//!     .bind("0.0.0.0:3001")
//!     .build(())
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod handler;
mod logging;
mod probe;
mod server;

pub use config::ServerConfig;
pub use error::ScribbleError;
pub use logging::init_tracing;
pub use probe::{StartupProbe, TcpProbe};
pub use server::{ScribbleServer, ScribbleServerBuilder};

pub mod prelude {
    //! Everything needed to configure and run a server.

    pub use crate::{
        ScribbleError, ScribbleServer, ScribbleServerBuilder, ServerConfig, StartupProbe,
        TcpProbe,
    };
    pub use scribble_protocol::{ClientEvent, Color, Phase, PlayerId, ServerEvent};
    pub use scribble_room::{RoomConfig, RoomHandle, RoomInfo};
    pub use scribble_tick::TickPolicy;
}
