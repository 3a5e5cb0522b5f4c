//! Connection handle
//!
//! A cheap, clonable handle to one live WebSocket peer. The socket itself is
//! owned by its handler task; this handle only feeds that task's writer.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Handle to a connected peer
///
/// Equality is identity: two handles are equal when they point at the
/// same socket.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Server → Client frame channel (already-encoded JSON text)
    sender: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// Create a new connection handle with the given ID and writer channel
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<String>) -> Self {
        Self { id, sender }
    }

    /// Create a handle together with the receiving end of its writer channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(ConnectionId::new(), tx), rx)
    }

    /// Encode and send a message to this peer
    ///
    /// Returns an error if the peer is gone. Never blocks.
    pub fn send(&self, msg: &ServerMessage) -> Result<(), SendError> {
        self.send_json(msg)
    }

    /// Encode any serializable value as one JSON text frame
    pub fn send_json<T>(&self, msg: &T) -> Result<(), SendError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(msg).map_err(|e| {
            error!("Failed to encode message for {}: {}", self.id, e);
            SendError::Encode(e)
        })?;
        self.send_raw(json)
    }

    /// Send an already-encoded frame verbatim
    pub fn send_raw(&self, frame: String) -> Result<(), SendError> {
        self.sender.send(frame).map_err(|_| {
            debug!("Dropped frame for closed connection {}", self.id);
            SendError::ChannelClosed
        })
    }

    /// Whether the writer side is still running
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}
