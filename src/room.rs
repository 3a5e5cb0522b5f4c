//! Room struct definition
//!
//! Represents a two-player room: the creator plus at most one opponent.

use std::time::{Duration, Instant};

use crate::connection::Connection;
use crate::types::{ConnectionId, RoomCode};

/// Two-player room
///
/// `members[0]` is the creator while they remain connected. Routing
/// otherwise treats both members the same.
#[derive(Debug)]
pub struct Room {
    /// Room code for identification
    pub code: RoomCode,
    /// Members in join order
    members: Vec<Connection>,
    /// Last time the room went from full to waiting (or was created)
    waiting_since: Instant,
}

impl Room {
    /// Maximum number of members
    pub const CAPACITY: usize = 2;

    /// Create a new room with the given code and owner
    pub fn new(code: RoomCode, owner: Connection) -> Self {
        let mut members = Vec::with_capacity(Self::CAPACITY);
        members.push(owner);
        Self {
            code,
            members,
            waiting_since: Instant::now(),
        }
    }

    pub fn members(&self) -> &[Connection] {
        &self.members
    }

    /// Check if room is full (2 people)
    pub fn is_full(&self) -> bool {
        self.members.len() >= Self::CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Get the number of members in the room
    pub fn participant_count(&self) -> usize {
        self.members.len()
    }

    /// Check if a connection is in this room
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Every member except `id`
    pub fn others(&self, id: ConnectionId) -> impl Iterator<Item = &Connection> {
        self.members.iter().filter(move |m| m.id != id)
    }

    /// Add the second member
    ///
    /// Only a room waiting with exactly one member accepts a joiner.
    pub fn add_member(&mut self, member: Connection) -> bool {
        if self.members.len() != 1 {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove every occurrence of a connection
    ///
    /// Returns true if anything was removed.
    pub fn remove_member(&mut self, id: ConnectionId) -> bool {
        let was_full = self.is_full();
        let before = self.members.len();
        self.members.retain(|m| m.id != id);

        let removed = self.members.len() != before;
        if removed && was_full {
            self.waiting_since = Instant::now();
        }
        removed
    }

    /// True when the room has been short of players for at least `ttl`
    pub fn is_abandoned(&self, ttl: Duration, now: Instant) -> bool {
        !self.is_full() && now.saturating_duration_since(self.waiting_since) >= ttl
    }
}
