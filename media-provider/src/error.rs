use thiserror::Error;

use crate::command::ControlCommand;

/// Errors surfaced to the caller of a playback command
///
/// Sampling never fails (failures collapse to `MediaState::Absent`); only
/// control commands report errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// No backend is currently playing anything
    #[error("no active media backend")]
    NoActiveBackend,

    /// The active backend cannot execute this command
    #[error("{backend} does not support {command}")]
    Unsupported {
        backend: String,
        command: ControlCommand,
    },

    /// The backend tried and failed
    #[error("{backend} rejected {command}: {reason}")]
    Rejected {
        backend: String,
        command: ControlCommand,
        reason: String,
    },

    /// The listener is stopped
    #[error("media listener is not running")]
    Unavailable,
}

impl ControlError {
    pub(crate) fn rejected(
        backend: impl Into<String>,
        command: ControlCommand,
        reason: impl ToString,
    ) -> Self {
        ControlError::Rejected {
            backend: backend.into(),
            command,
            reason: reason.to_string(),
        }
    }
}
