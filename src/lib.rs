//! Two-Player WebSocket Match Relay Library
//!
//! Pairs two peers into a room identified by a 6-digit code and relays
//! opaque `game` frames between them, built with axum WebSockets
//! using the Actor pattern for state management.
//!
//! # Protocol
//! - `{"type":"create"}` → `{"type":"created","code":"482913"}`
//! - `{"type":"join","code":"482913"}` → `{"type":"joined",...}`, then
//!   `{"type":"start"}` to both members
//! - `{"type":"game","code":"482913",...}` is forwarded verbatim to the
//!   other member
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RelayServer` is the central actor owning the `RoomRegistry`
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use match_relay::{serve, spawn_relay, RoomRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     let cmd_tx = spawn_relay(RoomRegistry::new(), None);
//!     serve(listener, cmd_tx).await.unwrap();
//! }
//! ```

pub mod acceptor;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod room;
pub mod router;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use acceptor::{app, serve, spawn_relay};
pub use config::{RelayConfig, RoomExpiry};
pub use connection::Connection;
pub use error::{AppError, FrameError, SendError};
pub use handler::handle_socket;
pub use message::{ClientMessage, ServerMessage};
pub use registry::{CodeSource, FixedCodes, RandomCodes, RoomRegistry};
pub use room::Room;
pub use router::Router;
pub use server::{RelayServer, ServerCommand};
pub use types::{ConnectionId, RoomCode};
