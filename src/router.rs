//! Message router
//!
//! Turns each inbound frame into registry operations and outbound sends.
//! Holds no session state of its own beyond the registry it is given.

use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::{AppError, FrameError};
use crate::message::{ClientMessage, ServerMessage};
use crate::registry::RoomRegistry;
use crate::types::{ConnectionId, RoomCode};

/// Dispatches frames against a room registry
#[derive(Debug, Default)]
pub struct Router {
    registry: RoomRegistry,
}

impl Router {
    pub fn new(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RoomRegistry {
        &mut self.registry
    }

    /// Handle one inbound frame from `from`
    ///
    /// Malformed frames are logged and dropped. Unknown types are answered
    /// with an error frame.
    pub fn handle_frame(&mut self, from: &Connection, frame: Result<ClientMessage, FrameError>) {
        match frame {
            Ok(ClientMessage::Create) => self.handle_create(from),
            Ok(ClientMessage::Join { code }) => self.handle_join(from, code),
            Ok(ClientMessage::Game { code, raw }) => self.handle_game(from, code, raw),
            Err(FrameError::Malformed(e)) => {
                warn!("Invalid JSON from {}: {}", from.id, e);
            }
            Err(err @ FrameError::UnknownType) => {
                debug!("Unknown message type from {}", from.id);
                let _ = from.send(&err.into());
            }
        }
    }

    /// Handle a closed connection
    pub fn handle_close(&mut self, id: ConnectionId) {
        let left = self.registry.remove_connection(id);
        for code in &left {
            if self.registry.contains(code) {
                debug!("Connection {} left room {}", id, code);
            } else {
                info!("Room {} deleted (empty)", code);
            }
        }
    }

    fn handle_create(&mut self, from: &Connection) {
        let code = match self.registry.create_room(from.clone()) {
            Ok(code) => code,
            Err(err) => {
                let _ = from.send(&err.into());
                return;
            }
        };
        info!("Connection {} created room {}", from.id, code);

        let _ = from.send(&ServerMessage::Created {
            code: code.to_string(),
        });
    }

    fn handle_join(&mut self, from: &Connection, code: Option<RoomCode>) {
        let Some(code) = code else {
            debug!("Connection {} sent join without a code", from.id);
            let _ = from.send(&AppError::InvalidOrFullCode.into());
            return;
        };

        if let Err(err) = self.registry.join(&code, from.clone()) {
            debug!("Connection {} rejected from room {}: {}", from.id, code, err);
            let _ = from.send(&err.into());
            return;
        }

        info!("Connection {} joined room {}", from.id, code);

        let _ = from.send(&ServerMessage::Joined {
            code: code.to_string(),
        });

        // Both sides learn the match has begun
        for member in self.registry.members(&code) {
            let _ = member.send(&ServerMessage::Start);
        }
    }

    fn handle_game(&mut self, from: &Connection, code: Option<RoomCode>, raw: String) {
        let Some(code) = code else {
            return;
        };

        let mut relayed = 0;
        for member in self.registry.members(&code) {
            if member.id != from.id {
                let _ = member.send_raw(raw.clone());
                relayed += 1;
            }
        }
        debug!("Relayed game frame in room {} to {} member(s)", code, relayed);
    }
}
