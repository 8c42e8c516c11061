//! WebSocket types and configuration

use std::time::Duration;

/// Fixed-delay, bounded reconnect policy
///
/// After a drop the client waits `delay` and tries again. Once
/// `max_attempts` consecutive attempts have failed it gives up for good.
/// A successful connection resets the attempt counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before every reconnection attempt
    pub delay: Duration,
    /// Maximum consecutive attempts before giving up (0 = infinite)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the next attempt, given how many attempts have already
    /// been made since the last successful connection. `None` means give up.
    pub fn next_delay(&self, attempts_made: u32) -> Option<Duration> {
        if self.max_attempts > 0 && attempts_made >= self.max_attempts {
            return None;
        }
        Some(self.delay)
    }
}

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Reconnection policy
    pub reconnect: ReconnectPolicy,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            reconnect: ReconnectPolicy::default(),
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.reconnect.max_attempts = n;
        self
    }

    /// Set the fixed reconnection delay
    pub fn reconnect_delay(mut self, d: Duration) -> Self {
        self.reconnect.delay = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// WebSocket message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Connection established
    Connected,
    /// Connection dropped (a reconnect may follow)
    Disconnected,
    /// Reconnecting after a drop
    Reconnecting { attempt: u32 },
    /// Reconnect attempts exhausted, no further messages will arrive
    GaveUp,
}

/// WebSocket errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum WsError {
    /// Connection failed or dropped
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Maximum reconnection attempts exceeded
    #[error("Maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_config_default() {
        let config = WsConfig::default();
        assert_eq!(config.reconnect.max_attempts, 10);
        assert_eq!(config.reconnect.delay, Duration::from_secs(5));
        assert_eq!(config.ping_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_ws_config_builder() {
        let config = WsConfig::new("wss://example.com")
            .max_reconnects(5)
            .reconnect_delay(Duration::from_millis(500))
            .ping_interval(Duration::from_secs(15));

        assert_eq!(config.url, "wss://example.com");
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.delay, Duration::from_millis(500));
        assert_eq!(config.ping_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_reconnect_policy_bounded() {
        let policy = ReconnectPolicy::default();
        for attempt in 0..10 {
            assert_eq!(policy.next_delay(attempt), Some(Duration::from_secs(5)));
        }
        assert_eq!(policy.next_delay(10), None);
        assert_eq!(policy.next_delay(11), None);
    }

    #[test]
    fn test_reconnect_policy_infinite() {
        let policy = ReconnectPolicy {
            delay: Duration::from_millis(1),
            max_attempts: 0,
        };
        assert!(policy.next_delay(10_000).is_some());
    }

    #[test]
    fn test_ws_error_display() {
        let err = WsError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        let err = WsError::MaxReconnectsExceeded;
        assert_eq!(err.to_string(), "Maximum reconnection attempts exceeded");
    }
}
