//! WebSocket client with bounded automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// How a single connection ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// Our receiver went away; stop for good
    ReceiverDropped,
    /// Server closed the socket; reconnect
    ServerClosed,
}

/// Push-only WebSocket client with fixed-delay reconnection and ping keepalive
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return a receiver for messages
    ///
    /// Spawns a background task that owns the connection. Dropping the
    /// receiver stops the task at its next send or before its next
    /// reconnection attempt.
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(1024);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, tx).await {
                tracing::error!(error = %e, "WebSocket connection loop ended");
            }
        });

        rx
    }

    /// Run the connection loop with bounded reconnection
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        let mut attempts: u32 = 0;

        loop {
            match Self::connect_and_stream(&config, &tx, &mut attempts).await {
                Ok(StreamEnd::ReceiverDropped) => {
                    tracing::debug!("Receiver dropped, closing connection");
                    return Ok(());
                }
                Ok(StreamEnd::ServerClosed) => {
                    tracing::warn!(url = %config.url, "WebSocket closed by server");
                    let _ = tx.send(WsMessage::Disconnected).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempts, "WebSocket connection error");
                    let _ = tx.send(WsMessage::Disconnected).await;
                }
            }

            if tx.is_closed() {
                tracing::info!("Receiver dropped, stopping reconnection");
                return Ok(());
            }

            let Some(delay) = config.reconnect.next_delay(attempts) else {
                tracing::error!(attempts, "Max reconnection attempts reached");
                let _ = tx.send(WsMessage::GaveUp).await;
                return Err(WsError::MaxReconnectsExceeded);
            };

            attempts += 1;
            let _ = tx.send(WsMessage::Reconnecting { attempt: attempts }).await;
            sleep(delay).await;
        }
    }

    /// Connect to WebSocket and stream messages until the connection ends
    ///
    /// Resets `attempts` once the handshake succeeds.
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
        attempts: &mut u32,
    ) -> Result<StreamEnd, WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        *attempts = 0;
        tracing::info!("WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(StreamEnd::ReceiverDropped);
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately.
        ping_interval.tick().await;

        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                return Ok(StreamEnd::ReceiverDropped);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Received close frame");
                            return Ok(StreamEnd::ServerClosed);
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::with_url("wss://example.com");
        assert_eq!(client.url(), "wss://example.com");
    }

    #[test]
    fn test_ws_client_with_config() {
        let config = WsConfig::new("wss://test.com")
            .max_reconnects(5)
            .ping_interval(Duration::from_secs(15));

        let client = WsClient::new(config);
        assert_eq!(client.url(), "wss://test.com");
        assert_eq!(client.config.reconnect.max_attempts, 5);
        assert_eq!(client.config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_ws_client_gives_up_after_max_attempts() {
        // Nothing listens on port 1, every attempt is refused
        let client = WsClient::new(
            WsConfig::new("ws://127.0.0.1:1")
                .max_reconnects(3)
                .reconnect_delay(Duration::from_millis(10)),
        );

        let mut rx = client.connect();

        let mut attempts_seen = Vec::new();
        let mut gave_up = false;
        let timeout = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(msg) = rx.recv().await {
                match msg {
                    WsMessage::Reconnecting { attempt } => attempts_seen.push(attempt),
                    WsMessage::GaveUp => {
                        gave_up = true;
                        break;
                    }
                    _ => {}
                }
            }
        });

        timeout.await.expect("Test timed out");
        assert!(gave_up, "Should give up after max attempts");
        assert_eq!(attempts_seen, vec![1, 2, 3]);

        // The task has exited, the channel is closed
        assert!(rx.recv().await.is_none());
    }
}
