//! Runs real helper processes through `sh`
#![cfg(unix)]

use std::time::{Duration, Instant};

use media_provider::{
    ControlCommand, ControlError, FieldLayout, HelperCommand, HelperError, HelperProvider,
    MediaState, Provider,
};

fn sh(script: &str) -> HelperCommand {
    HelperCommand::new("sh").arg("-c").arg(script)
}

#[test]
fn test_sample_parses_helper_output() {
    let provider = HelperProvider::new(
        "shell",
        sh("echo 'Song|Band|Record|https://img/a.jpg|Spotify'"),
    )
    .with_layout(FieldLayout::Basic);

    let state = provider.sample();
    let snapshot = state.snapshot().expect("helper reported a track");
    assert_eq!(snapshot.title(), Some("Song"));
    assert_eq!(snapshot.source_name(), "Spotify");
}

#[test]
fn test_silent_helper_means_absent() {
    let provider = HelperProvider::new("shell", sh("true"));
    assert_eq!(provider.sample(), MediaState::Absent);
}

#[test]
fn test_failing_helper_means_absent() {
    let provider = HelperProvider::new("shell", sh("echo 'A|B|C|D|1|2|x'; exit 3"));
    assert_eq!(provider.sample(), MediaState::Absent);
}

#[test]
fn test_hung_helper_is_killed() {
    let command = sh("sleep 5");
    let start = Instant::now();
    let err = command.run(Duration::from_millis(100)).unwrap_err();

    assert!(matches!(err, HelperError::TimedOut { .. }));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_control_invocations() {
    let provider = HelperProvider::new("shell", sh("true"))
        .with_control(ControlCommand::Next, sh("exit 0"))
        .with_control(ControlCommand::Previous, sh("exit 1"));

    assert_eq!(provider.control(ControlCommand::Next), Ok(()));
    assert!(matches!(
        provider.control(ControlCommand::Previous),
        Err(ControlError::Rejected { command: ControlCommand::Previous, .. })
    ));
    assert!(matches!(
        provider.control(ControlCommand::PlayPause),
        Err(ControlError::Unsupported { .. })
    ));
}

#[test]
fn test_large_output_does_not_block() {
    // Larger than a typical pipe buffer
    let provider = HelperProvider::new(
        "shell",
        sh("echo 'Song|Band|Record|null|1|2|x'; head -c 200000 /dev/zero | tr '\\0' 'a'"),
    );
    assert!(provider.sample().is_playing());
}

#[test]
fn test_background_process_cannot_outlive_timeout() {
    let provider = HelperProvider::new("shell", sh("echo 'A|B|C|null|1|2|x'; sleep 4 &"))
        .with_timeout(Duration::from_millis(300));

    let start = Instant::now();
    assert_eq!(provider.sample(), MediaState::Absent);
    assert!(start.elapsed() < Duration::from_secs(2));
}

/// Whether `pid` is a live (non-zombie) process
#[cfg(target_os = "linux")]
fn process_alive(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        // State is the first field after the parenthesised command name
        Ok(stat) => stat
            .rsplit_once(')')
            .map(|(_, rest)| !rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_timeout_kills_whole_process_group() {
    let pid_file = std::env::temp_dir().join(format!("helper-group-{}.pid", std::process::id()));
    let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());

    let err = sh(&script).run(Duration::from_millis(300)).unwrap_err();
    assert!(matches!(err, HelperError::TimedOut { .. }));

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    let _ = std::fs::remove_file(&pid_file);

    let deadline = Instant::now() + Duration::from_secs(2);
    while process_alive(&pid) {
        assert!(Instant::now() < deadline, "background process {pid} survived");
        std::thread::sleep(Duration::from_millis(20));
    }
}
