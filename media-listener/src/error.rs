//! Error types for the media-listener crate

/// Errors that can occur while starting the listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sampler thread could not be started
    #[error("Failed to spawn sampler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ListenerError>;
