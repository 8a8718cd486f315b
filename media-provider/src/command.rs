//! Playback control commands

use std::fmt;
use std::str::FromStr;

/// Fixed set of playback commands a provider can be asked to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    PlayPause,
    Next,
    Previous,
}

impl ControlCommand {
    /// All commands, in display order
    pub const ALL: [ControlCommand; 3] = [
        ControlCommand::PlayPause,
        ControlCommand::Next,
        ControlCommand::Previous,
    ];

    /// Canonical kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::PlayPause => "play-pause",
            ControlCommand::Next => "next",
            ControlCommand::Previous => "previous",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a command name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control command: {0}")]
pub struct ParseCommandError(pub String);

impl FromStr for ControlCommand {
    type Err = ParseCommandError;

    /// Accepts the canonical names plus the aliases clients already send
    /// (`back` for previous, `playpause` and `toggle` for play-pause).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play-pause" | "playpause" | "play_pause" | "toggle" => Ok(ControlCommand::PlayPause),
            "next" => Ok(ControlCommand::Next),
            "previous" | "prev" | "back" => Ok(ControlCommand::Previous),
            _ => Err(ParseCommandError(s.to_string())),
        }
    }
}
