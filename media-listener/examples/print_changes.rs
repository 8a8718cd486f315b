//! Print every now-playing change until Ctrl+C
//!
//! ```text
//! MEDIA_LISTENER_LOG_MODE=debug cargo run -p media-listener --example print_changes
//! ```

use std::sync::Arc;
use std::time::Duration;

use media_listener::logging::init_logging_from_env;
use media_listener::{ChangeEvent, ListenerConfig, MediaListener};
use media_provider::{default_provider, format_line, platform_name};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    println!("Watching {} (Ctrl+C to quit)", platform_name());
    let listener = Arc::new(MediaListener::start(
        default_provider(),
        ListenerConfig::responsive(),
    )?);

    {
        let listener = Arc::clone(&listener);
        ctrlc::set_handler(move || listener.stop())?;
    }

    let (current, subscription) = listener.subscribe_with_current();
    match current.snapshot() {
        Some(snapshot) => println!("now   {}", format_line(snapshot)),
        None => println!("now   nothing playing"),
    }

    while listener.is_running() {
        for event in subscription.timeout_iter(Duration::from_secs(1)) {
            match event {
                ChangeEvent::NewSnapshot(snapshot) => println!("new   {}", format_line(&snapshot)),
                ChangeEvent::Stopped => println!("stop"),
            }
        }
    }

    Ok(())
}
