//! JSON messages exchanged with clients
//!
//! A snapshot is serialised with the field names of [`Snapshot`]
//! (`title`, `artist`, `album`, `imageUrl`, `duration`, `position`,
//! `source`). The end of playback is the object `{"event":"stopped"}`.

use media_listener::ChangeEvent;
use media_provider::Snapshot;
use serde::{Deserialize, Serialize};

/// Out-of-band notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireEvent {
    Stopped,
}

/// One WebSocket text frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireMessage {
    Event { event: WireEvent },
    Snapshot(Snapshot),
}

impl WireMessage {
    pub fn stopped() -> Self {
        WireMessage::Event {
            event: WireEvent::Stopped,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<ChangeEvent> for WireMessage {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::NewSnapshot(snapshot) => WireMessage::Snapshot(snapshot),
            ChangeEvent::Stopped => WireMessage::stopped(),
        }
    }
}

impl From<Snapshot> for WireMessage {
    fn from(snapshot: Snapshot) -> Self {
        WireMessage::Snapshot(snapshot)
    }
}
