//! Change notifications delivered to subscribers

use media_provider::{MediaState, Snapshot};

/// A transition of the current media state
///
/// Subscribers only ever receive changes; "nothing received yet" is the
/// absence of an event, never a `Stopped`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Something new is playing, or the playing item changed
    NewSnapshot(Snapshot),
    /// Playback ended: the state moved from a snapshot to `Absent`
    Stopped,
}

impl ChangeEvent {
    /// Event describing the move from `old` to `new`
    ///
    /// Returns `None` when the states are equal or both `Absent`.
    pub fn between(old: &MediaState, new: &MediaState) -> Option<ChangeEvent> {
        if old == new {
            return None;
        }
        match (old, new) {
            (_, MediaState::Playing(snapshot)) => Some(ChangeEvent::NewSnapshot(snapshot.clone())),
            (MediaState::Playing(_), MediaState::Absent) => Some(ChangeEvent::Stopped),
            (MediaState::Absent, MediaState::Absent) => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            ChangeEvent::NewSnapshot(snapshot) => Some(snapshot),
            ChangeEvent::Stopped => None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, ChangeEvent::Stopped)
    }
}

impl From<ChangeEvent> for MediaState {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::NewSnapshot(snapshot) => MediaState::Playing(snapshot),
            ChangeEvent::Stopped => MediaState::Absent,
        }
    }
}
