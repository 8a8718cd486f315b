//! Now-playing data model
//!
//! [`MediaState`] is either [`MediaState::Absent`] ("nothing detected as
//! playing") or [`MediaState::Playing`] carrying an immutable [`Snapshot`].
//! Equality is structural, field by field, and is only used to detect change.

use serde::{Deserialize, Serialize};

/// One observed "currently playing" instant
///
/// Every field except the source is optional: backends report what they
/// know. Serialized field names match the wire format clients already
/// consume (`imageUrl`, `duration`, `position`, `source`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) title: Option<String>,
    pub(crate) artist: Option<String>,
    pub(crate) album: Option<String>,
    #[serde(rename = "imageUrl")]
    pub(crate) artwork_url: Option<String>,
    #[serde(rename = "duration")]
    pub(crate) duration_secs: Option<f64>,
    #[serde(rename = "position")]
    pub(crate) position_secs: Option<f64>,
    #[serde(rename = "source")]
    pub(crate) source_name: String,
}

impl Snapshot {
    /// Create an empty snapshot reported by `source_name`
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            title: None,
            artist: None,
            album: None,
            artwork_url: None,
            duration_secs: None,
            position_secs: None,
            source_name: source_name.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Set the track length; negative or non-finite values are discarded
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = valid_seconds(secs);
        self
    }

    /// Set the playback position; negative or non-finite values are discarded
    pub fn with_position_secs(mut self, secs: f64) -> Self {
        self.position_secs = valid_seconds(secs);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn position_secs(&self) -> Option<f64> {
        self.position_secs
    }

    /// Backend that reported this snapshot
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Check if the snapshot identifies anything at all
    ///
    /// A snapshot without title, artist and album does not describe a track.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none()
    }
}

pub(crate) fn valid_seconds(secs: f64) -> Option<f64> {
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}

/// Current media state: a snapshot, or nothing playing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MediaState {
    /// Nothing detected as playing
    #[default]
    Absent,
    /// Something is playing
    Playing(Snapshot),
}

impl MediaState {
    /// Build a state from an optional sample
    ///
    /// Missing and empty snapshots both collapse to `Absent`.
    pub fn from_sample(sample: Option<Snapshot>) -> Self {
        match sample {
            Some(snapshot) if !snapshot.is_empty() => MediaState::Playing(snapshot),
            _ => MediaState::Absent,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, MediaState::Playing(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, MediaState::Absent)
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            MediaState::Playing(snapshot) => Some(snapshot),
            MediaState::Absent => None,
        }
    }

    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            MediaState::Playing(snapshot) => Some(snapshot),
            MediaState::Absent => None,
        }
    }
}

impl From<Snapshot> for MediaState {
    fn from(snapshot: Snapshot) -> Self {
        MediaState::from_sample(Some(snapshot))
    }
}

impl From<Option<Snapshot>> for MediaState {
    fn from(sample: Option<Snapshot>) -> Self {
        MediaState::from_sample(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> Snapshot {
        Snapshot::new("spotify")
            .with_title(title)
            .with_artist("Artist")
            .with_album("Album")
    }

    #[test]
    fn test_absent_is_default() {
        assert_eq!(MediaState::default(), MediaState::Absent);
        assert!(MediaState::default().snapshot().is_none());
    }

    #[test]
    fn test_equality_is_field_by_field() {
        assert_eq!(track("A"), track("A"));
        assert_ne!(track("A"), track("B"));
        assert_ne!(track("A"), track("A").with_position_secs(1.0));
        assert_ne!(
            track("A"),
            Snapshot::new("music")
                .with_title("A")
                .with_artist("Artist")
                .with_album("Album")
        );
    }

    #[test]
    fn test_absent_differs_from_any_snapshot() {
        assert_eq!(MediaState::Absent, MediaState::Absent);
        assert_ne!(MediaState::Absent, MediaState::Playing(track("A")));
    }

    #[test]
    fn test_empty_snapshot_collapses_to_absent() {
        let empty = Snapshot::new("spotify").with_artwork_url("https://example.com/a.png");
        assert!(empty.is_empty());
        assert_eq!(MediaState::from(empty), MediaState::Absent);
        assert_eq!(MediaState::from(None), MediaState::Absent);
    }

    #[test]
    fn test_invalid_seconds_are_discarded() {
        let snapshot = track("A")
            .with_duration_secs(f64::NAN)
            .with_position_secs(-3.0);
        assert_eq!(snapshot.duration_secs(), None);
        assert_eq!(snapshot.position_secs(), None);

        let snapshot = snapshot.with_duration_secs(215.5);
        assert_eq!(snapshot.duration_secs(), Some(215.5));
    }

    #[test]
    fn test_serialized_field_names() {
        let snapshot = track("A")
            .with_artwork_url("https://example.com/a.png")
            .with_duration_secs(200.0);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["title"], "A");
        assert_eq!(json["imageUrl"], "https://example.com/a.png");
        assert_eq!(json["duration"], 200.0);
        assert!(json["position"].is_null());
        assert_eq!(json["source"], "spotify");
    }
}
