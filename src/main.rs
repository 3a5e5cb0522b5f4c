//! Match Relay - Entry Point
//!
//! Loads configuration, starts the RelayServer actor and accepts
//! connections until interrupted.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use match_relay::{serve, spawn_relay, RelayConfig, RoomRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=match_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("match_relay=info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    if let Some(expiry) = config.expiry {
        info!(
            "Waiting rooms expire after {}s (sweep every {}s)",
            expiry.ttl.as_secs(),
            expiry.sweep_interval.as_secs()
        );
    }

    let cmd_tx = spawn_relay(RoomRegistry::new(), config.expiry);

    // Start TCP listener
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Match relay listening on {}", addr);

    tokio::select! {
        result = serve(listener, cmd_tx) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
