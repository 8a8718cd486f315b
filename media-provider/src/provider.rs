//! The provider capability consumed by the listener core

use std::sync::Arc;

use crate::command::ControlCommand;
use crate::error::ControlError;
use crate::model::MediaState;

/// A source of "what is currently playing"
///
/// Implementations may block on I/O (spawning processes, bus calls); callers
/// run them on a dedicated thread and never while holding a lock.
///
/// # Contract
///
/// - [`sample`](Provider::sample) never fails: any internal error is reported
///   as [`MediaState::Absent`].
/// - [`control`](Provider::control) surfaces failures, including "nothing is
///   playing" as [`ControlError::NoActiveBackend`].
pub trait Provider: Send + Sync {
    /// Short backend name used in logs and errors
    fn name(&self) -> &str;

    /// Observe the current media state
    fn sample(&self) -> MediaState;

    /// Execute a playback command on the active backend
    fn control(&self, command: ControlCommand) -> Result<(), ControlError>;

    /// Release backend resources; called once when the listener stops
    fn shutdown(&self) {}
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sample(&self) -> MediaState {
        (**self).sample()
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        (**self).control(command)
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sample(&self) -> MediaState {
        (**self).sample()
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        (**self).control(command)
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}

/// Provider for platforms without a media backend
///
/// Always reports nothing playing; every command fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleProvider;

impl IdleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for IdleProvider {
    fn name(&self) -> &str {
        "idle"
    }

    fn sample(&self) -> MediaState {
        MediaState::Absent
    }

    fn control(&self, _command: ControlCommand) -> Result<(), ControlError> {
        Err(ControlError::NoActiveBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_provider() {
        let provider = IdleProvider::new();
        assert_eq!(provider.sample(), MediaState::Absent);
        assert_eq!(
            provider.control(ControlCommand::Next),
            Err(ControlError::NoActiveBackend)
        );
    }

    #[test]
    fn test_boxed_and_shared_providers_delegate() {
        let boxed: Box<dyn Provider> = Box::new(IdleProvider);
        assert_eq!(boxed.name(), "idle");

        let shared: Arc<dyn Provider> = Arc::new(boxed);
        assert_eq!(shared.name(), "idle");
        assert!(shared.sample().is_absent());
    }
}
