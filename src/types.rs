//! Basic type definitions for the relay
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: UUID-based runtime identity of one socket
//! - `RoomCode`: 6-digit numeric room code

use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Only used for equality comparisons while the socket is alive;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room code (6 decimal digits, no leading zero)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Smallest code that can be generated
    pub const MIN: u32 = 100_000;
    /// Largest code that can be generated
    pub const MAX: u32 = 999_999;

    /// Generate a new random code in `[MIN, MAX]`
    pub fn generate() -> Self {
        use rand::Rng;
        let n = rand::thread_rng().gen_range(Self::MIN..=Self::MAX);
        Self(n.to_string())
    }

    /// Wrap a code received from a client.
    ///
    /// No validation: an unknown code simply matches no room.
    pub fn from_string(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
