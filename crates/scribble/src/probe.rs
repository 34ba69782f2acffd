//! Startup dependency probes.
//!
//! The server checks its external collaborators once, before binding.
//! If a probe fails the server does not start.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;

/// A dependency that must be reachable before the server starts.
pub trait StartupProbe {
    /// Name used in logs and in [`ScribbleError::Dependency`](crate::ScribbleError::Dependency).
    fn name(&self) -> &str;

    /// Checks the dependency. `Err` carries a human-readable reason.
    async fn check(&self) -> Result<(), String>;
}

/// No dependencies: always passes.
impl StartupProbe for () {
    fn name(&self) -> &str {
        "none"
    }

    async fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Passes if a TCP connection to `addr` opens within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub name: String,
    pub addr: SocketAddr,
    pub timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl StartupProbe for TcpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), String> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("{}: {e}", self.addr)),
            Err(_) => Err(format!("{}: no answer within {:?}", self.addr, self.timeout)),
        }
    }
}
