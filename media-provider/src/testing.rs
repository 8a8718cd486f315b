//! Scripted provider for tests
//!
//! Enabled with the `test-support` feature so downstream crates can drive
//! the listener deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::command::ControlCommand;
use crate::error::ControlError;
use crate::model::{MediaState, Snapshot};
use crate::provider::Provider;

/// Provider replaying a script of states
///
/// Each `sample()` pops the next scripted state; once the script is
/// exhausted the last state repeats. Control commands are recorded and
/// succeed unless a failure is configured.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<MediaState>>,
    last: Mutex<MediaState>,
    control_failure: Mutex<Option<ControlError>>,
    controls: Mutex<Vec<ControlCommand>>,
    samples: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that replays `states` in order
    pub fn with_script<I>(states: I) -> Self
    where
        I: IntoIterator<Item = MediaState>,
    {
        let provider = Self::new();
        provider.script.lock().extend(states);
        provider
    }

    /// Provider that always reports `state`
    pub fn constant(state: MediaState) -> Self {
        let provider = Self::new();
        *provider.last.lock() = state;
        provider
    }

    /// Queue further states
    pub fn push(&self, state: MediaState) {
        self.script.lock().push_back(state);
    }

    /// Drop any queued states and report `state` from now on
    pub fn set_state(&self, state: MediaState) {
        self.script.lock().clear();
        *self.last.lock() = state;
    }

    /// Make subsequent control commands fail with `error`, or succeed with `None`
    pub fn fail_control_with(&self, error: Option<ControlError>) {
        *self.control_failure.lock() = error;
    }

    pub fn sample_count(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Commands received so far, in order
    pub fn controls(&self) -> Vec<ControlCommand> {
        self.controls.lock().clone()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn sample(&self) -> MediaState {
        self.samples.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock();
        if let Some(next) = self.script.lock().pop_front() {
            *last = next;
        }
        last.clone()
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        self.controls.lock().push(command);
        match self.control_failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Playing state with title, artist and album set
pub fn playing(title: &str, artist: &str, album: &str) -> MediaState {
    MediaState::Playing(
        Snapshot::new("scripted")
            .with_title(title)
            .with_artist(artist)
            .with_album(album),
    )
}
