//! Linux backend over the MPRIS D-Bus interface

use mpris::{PlaybackStatus, Player, PlayerFinder};
use tracing::{debug, info};

use crate::command::ControlCommand;
use crate::error::ControlError;
use crate::model::{MediaState, Snapshot};
use crate::provider::Provider;

const NAME: &str = "mpris";

/// Reports the first MPRIS player whose status is `Playing`
///
/// A fresh bus connection is opened per call; the session bus is local and
/// this keeps the provider free of non-`Sync` connection state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MprisProvider;

impl MprisProvider {
    pub fn new() -> Self {
        Self
    }

    fn playing_player(&self) -> Result<Option<Player>, String> {
        let finder =
            PlayerFinder::new().map_err(|e| format!("failed to connect to D-Bus: {e}"))?;
        let players = finder
            .find_all()
            .map_err(|e| format!("failed to enumerate players: {e}"))?;

        Ok(players.into_iter().find(|player| {
            matches!(player.get_playback_status(), Ok(PlaybackStatus::Playing))
        }))
    }

    /// Player that should receive a command: the playing one, else the
    /// bus's notion of the active (e.g. paused) player
    fn control_target(&self) -> Result<Option<Player>, String> {
        if let Some(player) = self.playing_player()? {
            return Ok(Some(player));
        }

        let finder =
            PlayerFinder::new().map_err(|e| format!("failed to connect to D-Bus: {e}"))?;
        Ok(finder.find_active().ok())
    }
}

fn snapshot_from(player: &Player) -> Option<Snapshot> {
    let metadata = player.get_metadata().ok()?;

    let mut snapshot = Snapshot::new(player.identity());
    snapshot.title = metadata.title().map(str::to_string);
    snapshot.artist = metadata
        .artists()
        .filter(|artists| !artists.is_empty())
        .map(|artists| artists.join(", "));
    snapshot.album = metadata.album_name().map(str::to_string);
    snapshot.artwork_url = metadata.art_url().map(str::to_string);

    if let Some(length) = metadata.length() {
        snapshot = snapshot.with_duration_secs(length.as_secs_f64());
    }
    if let Ok(position) = player.get_position() {
        snapshot = snapshot.with_position_secs(position.as_secs_f64());
    }

    Some(snapshot)
}

impl Provider for MprisProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn sample(&self) -> MediaState {
        match self.playing_player() {
            Ok(Some(player)) => MediaState::from_sample(snapshot_from(&player)),
            Ok(None) => MediaState::Absent,
            Err(e) => {
                debug!(error = %e, "mpris sample failed");
                MediaState::Absent
            }
        }
    }

    fn control(&self, command: ControlCommand) -> Result<(), ControlError> {
        let player = self
            .control_target()
            .map_err(|e| ControlError::rejected(NAME, command, e))?
            .ok_or(ControlError::NoActiveBackend)?;

        let result = match command {
            ControlCommand::PlayPause => player.play_pause(),
            ControlCommand::Next => player.next(),
            ControlCommand::Previous => player.previous(),
        };

        result.map_err(|e| ControlError::rejected(player.identity(), command, e))?;
        info!(player = %player.identity(), %command, "executed media command");
        Ok(())
    }
}
