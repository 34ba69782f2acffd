//! Server configuration.

use scribble_room::RoomConfig;

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Rules and timings of the room.
    pub room: RoomConfig,
}

impl ServerConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3001";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::DEFAULT_BIND_ADDR.to_string(),
            room: RoomConfig::default(),
        }
    }
}
