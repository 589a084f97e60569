//! Error types for sublink-client.

use thiserror::Error;

/// Main error type for all sublink operations.
#[derive(Debug, Error)]
pub enum SublinkError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error (auth payload, JSON wire profile).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame whose declared lengths do not fit the received buffer.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Server did not acknowledge authentication within the configured window.
    #[error("Authentication timed out")]
    AuthTimeout,

    /// Reconnect attempts exhausted; the client has given up.
    #[error("Reconnect attempts exhausted")]
    AttemptsExhausted,

    /// Operation requires an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Result type alias using SublinkError.
pub type Result<T> = std::result::Result<T, SublinkError>;
