//! Error types for the listener server

use std::net::SocketAddr;

use media_listener::ListenerError;

/// Errors that can occur while running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The HTTP listener could not be bound
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    /// The media listener failed to start
    #[error("Media listener error: {0}")]
    Listener(#[from] ListenerError),

    /// The server task ended abnormally
    #[error("Server task failed: {0}")]
    Join(String),
}
