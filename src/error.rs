//! Error types for the relay
//!
//! Defines application-level errors, inbound frame errors and
//! message send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection or startup termination) and
/// business errors (send error message to client).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - relay actor is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// Every candidate room code drawn was already taken
    #[error("No room code available")]
    NoCodeAvailable,

    /// Join target does not exist or already has two members
    #[error("Invalid or full code")]
    InvalidOrFullCode,

    /// Bad environment configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Inbound frame decoding errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// Not a JSON document (or not UTF-8)
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Valid JSON, but `type` is missing or not one we route
    #[error("Unknown message type")]
    UnknownType,
}

/// Message send errors
///
/// Occurs when the connection's writer has gone away or the message
/// cannot be encoded.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The message could not be encoded as JSON
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
