//! WebSocket connection handler
//!
//! Runs one upgraded socket: registers it with the RelayServer, forwards
//! inbound frames in order, and writes outbound frames until either side
//! goes away.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::connection::Connection;
use crate::error::AppError;
use crate::message::ClientMessage;
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Run one WebSocket session until either side goes away
pub async fn handle_socket(
    socket: WebSocket,
    peer_addr: SocketAddr,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    info!("Connection {} opened from {}", connection_id, peer_addr);

    // Channel for server -> peer frames
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();

    // Register with RelayServer
    if cmd_tx
        .send(ServerCommand::Connect {
            connection: Connection::new(connection_id, frame_tx),
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            let frame = match msg_result {
                Ok(Message::Text(text)) => ClientMessage::decode(&text),
                Ok(Message::Binary(data)) => ClientMessage::decode_bytes(&data),
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Pong replies are handled by the WebSocket layer
                    continue;
                }
                Err(e) => {
                    debug!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            };

            let cmd = ServerCommand::Received {
                connection_id,
                frame,
            };
            if cmd_tx_read.send(cmd).await.is_err() {
                debug!("Server closed, ending read task for {}", connection_id);
                break;
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Spawn write task (frames -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            if ws_sender.send(Message::Text(frame)).await.is_err() {
                debug!("WebSocket send failed, ending write task");
                break;
            }
        }
        debug!("Write task ended for connection");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", connection_id);
            read_task.abort();
        }
    }

    // The closed event: exactly once per connection
    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Connection {} closed", connection_id);

    Ok(())
}
