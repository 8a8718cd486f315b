//! Command-line arguments of the `media-listener` daemon

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use media_listener::logging::LoggingMode;
use media_listener::{ListenerConfig, DEFAULT_MAILBOX_CAPACITY};
use media_provider::{default_provider, FieldLayout, HelperCommand, HelperProvider, Provider};

use crate::server::DEFAULT_BIND;

/// Serve the local now-playing state over HTTP and WebSocket
#[derive(Parser, Debug, Clone)]
#[command(name = "media-listener", version)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "MEDIA_LISTENER_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Milliseconds between the starts of two samples
    #[arg(long, env = "MEDIA_LISTENER_POLL_INTERVAL_MS", default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Events each subscriber may have queued before new ones are dropped
    #[arg(long, env = "MEDIA_LISTENER_MAILBOX_CAPACITY", default_value_t = DEFAULT_MAILBOX_CAPACITY)]
    pub mailbox_capacity: usize,

    /// Sample this helper program instead of the platform backend
    #[arg(long, env = "MEDIA_LISTENER_HELPER")]
    pub helper: Option<String>,

    /// Argument passed to the helper (repeatable)
    #[arg(long = "helper-arg", allow_hyphen_values = true, requires = "helper")]
    pub helper_args: Vec<String>,

    /// Output layout of the helper: basic, timed or full
    #[arg(long, default_value = "full")]
    pub helper_layout: FieldLayout,

    /// Log output: silent, development, debug or json
    #[arg(long, env = "MEDIA_LISTENER_LOG_MODE", default_value = "development")]
    pub log_mode: LoggingMode,
}

impl Args {
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_mailbox_capacity(self.mailbox_capacity)
    }

    /// The configured helper, or the platform's default backend
    pub fn provider(&self) -> Box<dyn Provider> {
        match &self.helper {
            Some(program) => Box::new(
                HelperProvider::new(
                    "helper",
                    HelperCommand::new(program).args(self.helper_args.iter().cloned()),
                )
                .with_layout(self.helper_layout),
            ),
            None => default_provider(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["media-listener"]).unwrap();
        assert_eq!(args.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(args.listener_config(), ListenerConfig::default());
        assert_eq!(args.helper_layout, FieldLayout::Full);
        assert!(args.helper.is_none());
    }

    #[test]
    fn test_helper_arguments() {
        let args = Args::try_parse_from([
            "media-listener",
            "--helper",
            "nowplaying",
            "--helper-arg",
            "--format",
            "--helper-arg",
            "pipe",
            "--helper-layout",
            "basic",
        ])
        .unwrap();

        assert_eq!(args.helper.as_deref(), Some("nowplaying"));
        assert_eq!(args.helper_args, vec!["--format", "pipe"]);
        assert_eq!(args.helper_layout, FieldLayout::Basic);
        assert_eq!(args.provider().name(), "helper");
    }

    #[test]
    fn test_tuning() {
        let args = Args::try_parse_from([
            "media-listener",
            "--poll-interval-ms",
            "250",
            "--mailbox-capacity",
            "2",
            "--bind",
            "127.0.0.1:0",
            "--log-mode",
            "json",
        ])
        .unwrap();

        let config = args.listener_config();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.mailbox_capacity, 2);
        assert_eq!(args.log_mode, LoggingMode::Json);
    }

    #[test]
    fn test_rejects_unknown_layout() {
        assert!(Args::try_parse_from(["media-listener", "--helper-layout", "csv"]).is_err());
    }

    #[test]
    fn test_helper_arg_requires_helper() {
        assert!(Args::try_parse_from(["media-listener", "--helper-arg", "x"]).is_err());
    }
}
