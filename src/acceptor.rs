//! Connection acceptor
//!
//! Starts the relay actor and serves HTTP on the listening port: `GET /`
//! answers the liveness check, and any WebSocket upgrade is handed to its
//! own handler task.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::RoomExpiry;
use crate::error::AppError;
use crate::handler::handle_socket;
use crate::registry::RoomRegistry;
use crate::server::{RelayServer, ServerCommand};

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Body returned by `GET /`
pub const LIVENESS_BODY: &str = "Match Relay Online";

/// Spawn the RelayServer actor and return its command channel
pub fn spawn_relay(
    registry: RoomRegistry,
    expiry: Option<RoomExpiry>,
) -> mpsc::Sender<ServerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = RelayServer::new(cmd_rx, registry).with_expiry(expiry);
    tokio::spawn(server.run());

    info!("RelayServer actor started");
    cmd_tx
}

/// HTTP routes: liveness on `/`, WebSocket upgrades on any path
pub fn app(cmd_tx: mpsc::Sender<ServerCommand>) -> axum::Router {
    axum::Router::new()
        .route("/", get(root))
        .fallback(upgrade_or_not_found)
        .with_state(cmd_tx)
}

/// Serve connections until the listener fails
pub async fn serve(
    listener: TcpListener,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    axum::serve(
        listener,
        app(cmd_tx).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn root(
    ws: Option<WebSocketUpgrade>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(cmd_tx): State<mpsc::Sender<ServerCommand>>,
) -> Response {
    match ws {
        Some(ws) => upgrade(ws, peer, cmd_tx),
        None => LIVENESS_BODY.into_response(),
    }
}

async fn upgrade_or_not_found(
    ws: Option<WebSocketUpgrade>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(cmd_tx): State<mpsc::Sender<ServerCommand>>,
) -> Response {
    match ws {
        Some(ws) => upgrade(ws, peer, cmd_tx),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn upgrade(ws: WebSocketUpgrade, peer: SocketAddr, cmd_tx: mpsc::Sender<ServerCommand>) -> Response {
    info!("New connection from {}", peer);
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_socket(socket, peer, cmd_tx).await {
            error!("Connection handler error: {}", e);
        }
    })
}
