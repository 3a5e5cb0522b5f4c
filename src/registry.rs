//! Room registry
//!
//! Owns every open room, keyed by code. Not thread-safe on purpose: the
//! `RelayServer` actor is its only owner, so each operation runs to
//! completion before the next one starts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::AppError;
use crate::room::Room;
use crate::types::{ConnectionId, RoomCode};

/// How many taken codes `create_room` skips before failing
pub const MAX_CODE_ATTEMPTS: usize = 64;

/// Source of candidate room codes
pub trait CodeSource: Send {
    fn next_code(&mut self) -> RoomCode;
}

/// Uniformly random 6-digit codes
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&mut self) -> RoomCode {
        RoomCode::generate()
    }
}

/// Replays a fixed list of codes, then falls back to random ones
#[derive(Debug, Default, Clone)]
pub struct FixedCodes(std::collections::VecDeque<RoomCode>);

impl FixedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            codes
                .into_iter()
                .map(|c| RoomCode::from_string(c.into()))
                .collect(),
        )
    }
}

impl CodeSource for FixedCodes {
    fn next_code(&mut self) -> RoomCode {
        self.0.pop_front().unwrap_or_else(RoomCode::generate)
    }
}

/// Mapping from room code to room
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    codes: Box<dyn CodeSource>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms)
            .finish_non_exhaustive()
    }
}

impl RoomRegistry {
    /// Registry drawing random codes
    pub fn new() -> Self {
        Self::with_codes(RandomCodes)
    }

    /// Registry drawing codes from `codes`
    pub fn with_codes(codes: impl CodeSource + 'static) -> Self {
        Self {
            rooms: HashMap::new(),
            codes: Box::new(codes),
        }
    }

    /// Open a room with `owner` as its only member
    ///
    /// Codes held by an open room are redrawn, so an existing room is never
    /// replaced. Gives up after `MAX_CODE_ATTEMPTS` taken codes.
    pub fn create_room(&mut self, owner: Connection) -> Result<RoomCode, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.codes.next_code();
            if self.rooms.contains_key(&code) {
                debug!("Room code {} already in use, drawing again", code);
                continue;
            }

            self.rooms
                .insert(code.clone(), Room::new(code.clone(), owner));
            return Ok(code);
        }

        warn!(
            "No free room code after {} attempts ({} rooms open)",
            MAX_CODE_ATTEMPTS,
            self.rooms.len()
        );
        Err(AppError::NoCodeAvailable)
    }

    /// Add `connection` as the second member of the room at `code`
    ///
    /// Unknown and full rooms are rejected alike; the registry is left
    /// untouched on failure.
    pub fn join(&mut self, code: &RoomCode, connection: Connection) -> Result<(), AppError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or(AppError::InvalidOrFullCode)?;

        if room.add_member(connection) {
            Ok(())
        } else {
            Err(AppError::InvalidOrFullCode)
        }
    }

    /// Members of the room at `code`, empty if there is no such room
    pub fn members(&self, code: &RoomCode) -> &[Connection] {
        self.rooms.get(code).map(Room::members).unwrap_or(&[])
    }

    /// Drop a connection from every room it is in
    ///
    /// Rooms left empty are deleted. Returns the codes of the rooms the
    /// connection was removed from; calling it again returns nothing.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Vec<RoomCode> {
        let mut left = Vec::new();

        self.rooms.retain(|code, room| {
            if room.remove_member(id) {
                left.push(code.clone());
            }
            !room.is_empty()
        });

        left
    }

    /// Remove rooms that have been waiting for a second player for at least `ttl`
    pub fn expire_abandoned(&mut self, ttl: Duration) -> Vec<RoomCode> {
        let now = Instant::now();
        let mut expired = Vec::new();

        self.rooms.retain(|code, room| {
            let abandoned = room.is_abandoned(ttl, now);
            if abandoned {
                expired.push(code.clone());
            }
            !abandoned
        });

        expired
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Number of open rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
