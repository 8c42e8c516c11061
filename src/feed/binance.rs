//! Binance WebSocket price feed implementation

use super::{FeedEvent, PriceFeed, PriceTick};
use crate::ws::{ReconnectPolicy, WsClient, WsConfig, WsMessage};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

/// Binance WebSocket base URL
pub const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Binance trade message structure
#[derive(Debug, Deserialize)]
struct BinanceTradeMessage {
    /// Event type
    #[serde(rename = "e")]
    event_type: String,
    /// Symbol
    #[serde(rename = "s")]
    symbol: String,
    /// Price
    #[serde(rename = "p")]
    price: String,
    /// Trade time (milliseconds)
    #[serde(rename = "T")]
    trade_time: i64,
}

/// Binance WebSocket feed for a `<symbol>@trade` stream
pub struct BinanceFeed {
    symbol: String,
    base_url: String,
    reconnect: ReconnectPolicy,
}

impl BinanceFeed {
    /// Create a new Binance feed for the given symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_lowercase(),
            base_url: BINANCE_WS_URL.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Override the reconnect policy
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Override the WebSocket base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the WebSocket URL for the trade stream
    fn build_ws_url(&self) -> String {
        format!("{}/{}@trade", self.base_url, self.symbol)
    }

    /// Parse a Binance trade message into a PriceTick
    ///
    /// Anything that is not a well-formed trade with a decimal price is
    /// dropped.
    fn parse_message(msg: &str) -> Option<PriceTick> {
        let trade: BinanceTradeMessage = serde_json::from_str(msg).ok()?;

        if trade.event_type != "trade" {
            return None;
        }

        let price = Decimal::from_str(&trade.price).ok()?;
        let exchange_ts = Utc.timestamp_millis_opt(trade.trade_time).single()?;

        Some(PriceTick {
            symbol: trade.symbol,
            price,
            exchange_ts,
        })
    }

    /// Run the message processing loop
    async fn run_message_loop(
        mut ws_rx: mpsc::Receiver<WsMessage>,
        event_tx: mpsc::Sender<FeedEvent>,
    ) {
        while let Some(msg) = ws_rx.recv().await {
            let event = match msg {
                WsMessage::Text(text) => match Self::parse_message(&text) {
                    Some(tick) => FeedEvent::Trade(tick),
                    None => continue,
                },
                WsMessage::Connected => {
                    tracing::info!("Binance feed connected");
                    FeedEvent::Connected
                }
                WsMessage::Disconnected => {
                    tracing::warn!("Binance feed disconnected");
                    FeedEvent::Disconnected
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::warn!(attempt, "Binance feed reconnecting...");
                    FeedEvent::Reconnecting { attempt }
                }
                WsMessage::GaveUp => {
                    tracing::error!("Binance feed gave up reconnecting");
                    let _ = event_tx.send(FeedEvent::GaveUp).await;
                    break;
                }
            };

            if event_tx.send(event).await.is_err() {
                tracing::debug!("Event receiver dropped, stopping feed");
                break;
            }
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedEvent>> {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let url = self.build_ws_url();

        tracing::info!(symbol = %self.symbol, "Subscribing to Binance feed");

        let config = WsConfig::new(url)
            .max_reconnects(self.reconnect.max_attempts)
            .reconnect_delay(self.reconnect.delay)
            .ping_interval(Duration::from_secs(30));

        let client = WsClient::new(config);
        let ws_rx = client.connect();

        tokio::spawn(async move {
            Self::run_message_loop(ws_rx, event_tx).await;
        });

        Ok(event_rx)
    }
}
