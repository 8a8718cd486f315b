//! Configuration for the media listener

use std::time::Duration;

use crate::error::{ListenerError, Result};

/// Default time between the starts of two consecutive samples
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of events a subscriber mailbox can hold
pub const DEFAULT_MAILBOX_CAPACITY: usize = 5;

/// Configuration for a [`MediaListener`](crate::MediaListener)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Interval between sample starts
    /// Default: 500 ms
    pub poll_interval: Duration,

    /// Capacity of each subscriber mailbox
    /// Default: 5
    pub mailbox_capacity: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl ListenerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faster polling for interactive displays
    pub fn responsive() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            mailbox_capacity: 10,
        }
    }

    /// Slow polling for battery-powered machines
    pub fn low_power() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ListenerError::InvalidConfig(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.mailbox_capacity == 0 {
            return Err(ListenerError::InvalidConfig(
                "Mailbox capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ListenerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.mailbox_capacity, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ListenerConfig::responsive().validate().is_ok());
        assert!(ListenerConfig::low_power().validate().is_ok());
        assert!(
            ListenerConfig::responsive().poll_interval < ListenerConfig::low_power().poll_interval
        );
    }

    #[test]
    fn test_validation() {
        let config = ListenerConfig::new().with_poll_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ListenerError::InvalidConfig(_))
        ));

        let config = ListenerConfig::new().with_mailbox_capacity(0);
        assert!(config.validate().is_err());
    }
}
