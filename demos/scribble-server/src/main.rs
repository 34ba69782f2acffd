//! Scribble game server.
//!
//! ```bash
//! scribble-server                                  # 0.0.0.0:3001, 60s rounds
//! scribble-server --bind 127.0.0.1:4000 --round-secs 90
//! SCRIBBLE_STORE_ADDR=127.0.0.1:27017 scribble-server   # refuse to start without the store
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use scribble::prelude::*;

/// Drawing-and-guessing game server
#[derive(Parser, Debug)]
#[command(name = "scribble-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to accept WebSocket connections on
    #[arg(long, env = "SCRIBBLE_BIND", default_value = ServerConfig::DEFAULT_BIND_ADDR)]
    bind: String,

    /// Player profile store that must be reachable before startup
    #[arg(long, env = "SCRIBBLE_STORE_ADDR")]
    store_addr: Option<SocketAddr>,

    /// Length of a round in seconds
    #[arg(long, env = "SCRIBBLE_ROUND_SECS", default_value_t = 60)]
    round_secs: u32,

    /// Length of the pre-round countdown in seconds
    #[arg(long, env = "SCRIBBLE_COUNTDOWN_SECS", default_value_t = 5)]
    countdown_secs: u32,

    /// What the round timer does after a stall: skip (resync) or drop (keep cadence)
    #[arg(long, env = "SCRIBBLE_TICK_POLICY", default_value_t = TickPolicy::Skip)]
    tick_policy: TickPolicy,

    /// Seed for drawer and word selection (random if unset)
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.clone(),
            room: RoomConfig {
                round_ticks: self.round_secs,
                countdown_ticks: self.countdown_secs,
                tick_interval: Duration::from_secs(1),
                tick_policy: self.tick_policy,
                ..RoomConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    scribble::init_tracing(&args.log_level);

    tracing::info!("scribble-server v{}", env!("CARGO_PKG_VERSION"));

    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: Args) -> Result<(), ScribbleError> {
    let mut builder = ScribbleServerBuilder::from_config(args.server_config());
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    let server = match args.store_addr {
        Some(addr) => builder.build(TcpProbe::new("profile-store", addr)).await?,
        None => builder.build(()).await?,
    };

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for ctrl-c; running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["scribble-server"]).unwrap();
        assert_eq!(args.bind, "0.0.0.0:3001");
        assert_eq!(args.round_secs, 60);
        assert_eq!(args.countdown_secs, 5);
        assert!(args.store_addr.is_none());
        assert!(args.seed.is_none());

        let config = args.server_config();
        assert_eq!(config.room.round_ticks, 60);
        assert_eq!(config.room.countdown_ticks, 5);
        assert_eq!(config.room.tick_policy, TickPolicy::Skip);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "scribble-server",
            "--bind",
            "127.0.0.1:4000",
            "--store-addr",
            "127.0.0.1:27017",
            "--round-secs",
            "90",
            "--countdown-secs",
            "3",
            "--seed",
            "7",
            "--tick-policy",
            "drop",
        ])
        .unwrap();

        assert_eq!(args.bind, "127.0.0.1:4000");
        assert_eq!(args.store_addr, Some("127.0.0.1:27017".parse().unwrap()));
        assert_eq!(args.seed, Some(7));

        let config = args.server_config();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.room.round_ticks, 90);
        assert_eq!(config.room.countdown_ticks, 3);
        assert_eq!(config.room.tick_policy, TickPolicy::Drop);
    }

    #[test]
    fn test_unknown_tick_policy_is_rejected() {
        let result = Args::try_parse_from(["scribble-server", "--tick-policy", "burst"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_store_address_is_rejected() {
        let result = Args::try_parse_from(["scribble-server", "--store-addr", "not-an-addr"]);
        assert!(result.is_err());
    }
}
