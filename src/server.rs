//! RelayServer Actor implementation
//!
//! The central actor that owns the room registry. Every connection handler
//! talks to it through one mpsc channel, so registry operations are applied
//! one at a time, in arrival order.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::RoomExpiry;
use crate::connection::Connection;
use crate::error::FrameError;
use crate::message::ClientMessage;
use crate::registry::RoomRegistry;
use crate::router::Router;
use crate::types::ConnectionId;

/// Commands sent from handlers to the RelayServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New peer connected
    Connect { connection: Connection },
    /// One decoded inbound frame, in the order the peer sent it
    Received {
        connection_id: ConnectionId,
        frame: Result<ClientMessage, FrameError>,
    },
    /// Peer disconnected; sent exactly once per connection
    Disconnect { connection_id: ConnectionId },
}

/// The main RelayServer actor
pub struct RelayServer {
    /// All live connections: ConnectionId -> Connection
    connections: HashMap<ConnectionId, Connection>,
    /// Frame dispatch and room state
    router: Router,
    /// Abandoned-room expiry, if enabled
    expiry: Option<RoomExpiry>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl RelayServer {
    /// Create a new RelayServer with the given command receiver and registry
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, registry: RoomRegistry) -> Self {
        Self {
            connections: HashMap::new(),
            router: Router::new(registry),
            expiry: None,
            receiver,
        }
    }

    /// Periodically drop rooms that wait too long for a second player
    pub fn with_expiry(mut self, expiry: Option<RoomExpiry>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Run the RelayServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("RelayServer started");

        let mut sweep = self.expiry.map(|expiry| {
            let mut interval = time::interval(expiry.sweep_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_sweep(&mut sweep) => self.expire_rooms(),
            }
        }

        info!("RelayServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { connection } => {
                self.handle_connect(connection);
            }
            ServerCommand::Received {
                connection_id,
                frame,
            } => {
                self.handle_received(connection_id, frame);
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id);
            }
        }
    }

    /// Handle new connection
    fn handle_connect(&mut self, connection: Connection) {
        debug!("Connection {} registered", connection.id);
        self.connections.insert(connection.id, connection);
        debug!(
            "Total connections: {}, Total rooms: {}",
            self.connections.len(),
            self.router.registry().len()
        );
    }

    /// Handle one inbound frame
    fn handle_received(
        &mut self,
        connection_id: ConnectionId,
        frame: Result<ClientMessage, FrameError>,
    ) {
        let Some(connection) = self.connections.get(&connection_id) else {
            debug!("Frame from unregistered connection {}", connection_id);
            return;
        };

        self.router.handle_frame(connection, frame);
    }

    /// Handle disconnection
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);
        self.router.handle_close(connection_id);

        debug!(
            "Total connections: {}, Total rooms: {}",
            self.connections.len(),
            self.router.registry().len()
        );
    }

    /// Drop rooms that outlived the configured TTL
    fn expire_rooms(&mut self) {
        let Some(expiry) = self.expiry else {
            return;
        };

        let expired = self.router.registry_mut().expire_abandoned(expiry.ttl);
        for code in &expired {
            info!("Room {} expired waiting for a second player", code);
        }
    }
}

/// Resolves on the next sweep tick, or never if expiry is disabled
async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::registry::FixedCodes;

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_actor_routes_in_order() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let registry = RoomRegistry::with_codes(FixedCodes::new(["482913"]));
        tokio::spawn(RelayServer::new(cmd_rx, registry).run());

        let (a, mut rx_a) = Connection::channel();
        let (b, mut rx_b) = Connection::channel();
        for connection in [a.clone(), b.clone()] {
            cmd_tx.send(ServerCommand::Connect { connection }).await.unwrap();
        }

        let frames = [
            (a.id, r#"{"type":"create"}"#),
            (b.id, r#"{"type":"join","code":"482913"}"#),
            (a.id, r#"{"type":"game","code":"482913","n":1}"#),
            (a.id, r#"{"type":"game","code":"482913","n":2}"#),
        ];
        for (connection_id, text) in frames {
            cmd_tx
                .send(ServerCommand::Received {
                    connection_id,
                    frame: ClientMessage::decode(text),
                })
                .await
                .unwrap();
        }

        assert_eq!(recv(&mut rx_a).await, r#"{"type":"created","code":"482913"}"#);
        assert_eq!(recv(&mut rx_a).await, r#"{"type":"start"}"#);
        assert_eq!(recv(&mut rx_b).await, r#"{"type":"joined","code":"482913"}"#);
        assert_eq!(recv(&mut rx_b).await, r#"{"type":"start"}"#);
        assert_eq!(recv(&mut rx_b).await, r#"{"type":"game","code":"482913","n":1}"#);
        assert_eq!(recv(&mut rx_b).await, r#"{"type":"game","code":"482913","n":2}"#);
    }

    #[tokio::test]
    async fn test_disconnect_frees_room() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let registry = RoomRegistry::with_codes(FixedCodes::new(["111111"]));
        tokio::spawn(RelayServer::new(cmd_rx, registry).run());

        let (a, mut rx_a) = Connection::channel();
        let (b, mut rx_b) = Connection::channel();
        for connection in [a.clone(), b.clone()] {
            cmd_tx.send(ServerCommand::Connect { connection }).await.unwrap();
        }

        cmd_tx
            .send(ServerCommand::Received {
                connection_id: a.id,
                frame: ClientMessage::decode(r#"{"type":"create"}"#),
            })
            .await
            .unwrap();
        recv(&mut rx_a).await;

        cmd_tx
            .send(ServerCommand::Disconnect { connection_id: a.id })
            .await
            .unwrap();
        cmd_tx
            .send(ServerCommand::Received {
                connection_id: b.id,
                frame: ClientMessage::decode(r#"{"type":"join","code":"111111"}"#),
            })
            .await
            .unwrap();

        assert_eq!(
            recv(&mut rx_b).await,
            r#"{"type":"error","msg":"Invalid or full code"}"#
        );
    }

    #[tokio::test]
    async fn test_expired_room_cannot_be_joined() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let registry = RoomRegistry::with_codes(FixedCodes::new(["222222"]));
        let expiry = RoomExpiry {
            ttl: Duration::from_millis(10),
            sweep_interval: Duration::from_millis(10),
        };
        tokio::spawn(RelayServer::new(cmd_rx, registry).with_expiry(Some(expiry)).run());

        let (a, mut rx_a) = Connection::channel();
        let (b, mut rx_b) = Connection::channel();
        for connection in [a.clone(), b.clone()] {
            cmd_tx.send(ServerCommand::Connect { connection }).await.unwrap();
        }

        cmd_tx
            .send(ServerCommand::Received {
                connection_id: a.id,
                frame: ClientMessage::decode(r#"{"type":"create"}"#),
            })
            .await
            .unwrap();
        recv(&mut rx_a).await;

        time::sleep(Duration::from_millis(100)).await;

        cmd_tx
            .send(ServerCommand::Received {
                connection_id: b.id,
                frame: ClientMessage::decode(r#"{"type":"join","code":"222222"}"#),
            })
            .await
            .unwrap();

        assert_eq!(
            recv(&mut rx_b).await,
            r#"{"type":"error","msg":"Invalid or full code"}"#
        );
    }
}
