//! macOS backends driven through `osascript`
//!
//! One [`HelperProvider`] per supported player application, combined into a
//! [`CompositeProvider`] in priority order. Scripts only talk to an
//! application that is already running so sampling never launches a player.

use crate::command::ControlCommand;
use crate::composite::CompositeProvider;
use crate::helper::{HelperCommand, HelperProvider};
use crate::protocol::FieldLayout;

/// A scriptable player application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerApp {
    /// Name AppleScript addresses the application by
    pub app_name: &'static str,
    /// Name reported as the snapshot source
    pub display_name: &'static str,
    /// Whether `duration of current track` is reported in milliseconds
    pub duration_in_millis: bool,
}

pub const SPOTIFY: PlayerApp = PlayerApp {
    app_name: "Spotify",
    display_name: "Spotify",
    duration_in_millis: true,
};

pub const APPLE_MUSIC: PlayerApp = PlayerApp {
    app_name: "Music",
    display_name: "Apple Music",
    duration_in_millis: false,
};

/// Players polled by default, highest priority first
pub const SUPPORTED_APPS: [PlayerApp; 2] = [SPOTIFY, APPLE_MUSIC];

/// Script printing a `Timed` layout line, or nothing when the app is idle
pub fn now_playing_script(app: &PlayerApp) -> String {
    let duration = if app.duration_in_millis {
        "(duration of current track) / 1000"
    } else {
        "duration of current track"
    };

    format!(
        r#"if application "{name}" is running then
    tell application "{name}"
        if player state is playing then
            try
                set t to name of current track
            on error
                set t to "null"
            end try
            try
                set ar to artist of current track
            on error
                set ar to "null"
            end try
            try
                set al to album of current track
            on error
                set al to "null"
            end try
            try
                set artUrl to artwork url of current track
            on error
                set artUrl to "null"
            end try
            try
                set dur to ({duration}) as string
            on error
                set dur to "null"
            end try
            try
                set pos to (player position) as string
            on error
                set pos to "null"
            end try
            return t & "|" & ar & "|" & al & "|" & artUrl & "|" & dur & "|" & pos
        end if
    end tell
end if"#,
        name = app.app_name,
    )
}

/// Script executing `command` if the app is running
pub fn control_script(app: &PlayerApp, command: ControlCommand) -> String {
    let verb = match command {
        ControlCommand::PlayPause => "playpause",
        ControlCommand::Next => "next track",
        ControlCommand::Previous => "previous track",
    };

    format!(
        r#"if application "{name}" is running then
    tell application "{name}" to {verb}
end if"#,
        name = app.app_name,
    )
}

fn osascript(script: String) -> HelperCommand {
    HelperCommand::new("osascript").arg("-e").arg(script)
}

/// Helper provider for a single application
pub fn app_provider(app: &PlayerApp) -> HelperProvider {
    ControlCommand::ALL.into_iter().fold(
        HelperProvider::new(app.display_name, osascript(now_playing_script(app)))
            .with_layout(FieldLayout::Timed),
        |provider, command| provider.with_control(command, osascript(control_script(app, command))),
    )
}

/// Composite over every supported application
pub fn apple_script_provider() -> CompositeProvider {
    SUPPORTED_APPS
        .iter()
        .fold(CompositeProvider::new("apple-script"), |composite, app| {
            composite.with_backend(app_provider(app))
        })
}
