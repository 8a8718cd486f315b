//! Provider that polls several backends in priority order

use parking_lot::Mutex;
use tracing::trace;

use crate::command::ControlCommand;
use crate::error::ControlError;
use crate::model::MediaState;
use crate::provider::Provider;

/// Polls backends in order and reports the first one that is playing
///
/// The backend that produced the last `Playing` sample becomes the target of
/// control commands. When nothing plays, commands fail with
/// [`ControlError::NoActiveBackend`].
pub struct CompositeProvider {
    name: String,
    backends: Vec<Box<dyn Provider>>,
    active: Mutex<Option<usize>>,
}

impl CompositeProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backends: Vec::new(),
            active: Mutex::new(None),
        }
    }

    /// Append a backend; earlier backends win when several are playing
    pub fn with_backend(mut self, backend: impl Provider + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Name of the backend commands are currently routed to
    pub fn active_backend(&self) -> Option<&str> {
        let index = (*self.active.lock())?;
        self.backends.get(index).map(|backend| backend.name())
    }
}

impl Provider for CompositeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> MediaState {
        for (index, backend) in self.backends.iter().enumerate() {
            let state = backend.sample();
            if state.is_playing() {
                trace!(backend = backend.name(), "backend is playing");
                *self.active.lock() = Some(index);
                return state;
            }
        }

        *self.active.lock() = None;
        MediaState::Absent
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        // Copy the index out so the backend call runs without the lock held
        let active = *self.active.lock();
        match active.and_then(|index| self.backends.get(index)) {
            Some(backend) => backend.control(command),
            None => Err(ControlError::NoActiveBackend),
        }
    }

    fn shutdown(&self) {
        for backend in &self.backends {
            backend.shutdown();
        }
    }
}

impl std::fmt::Debug for CompositeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("CompositeProvider")
            .field("name", &self.name)
            .field("backends", &names)
            .field("active", &*self.active.lock())
            .finish()
    }
}
