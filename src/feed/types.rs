//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single trade print from an exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Trade price
    pub price: Decimal,
    /// Exchange timestamp (e.g., Binance trade time)
    pub exchange_ts: DateTime<Utc>,
}

/// Events delivered by a price feed subscription
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A parsed trade
    Trade(PriceTick),
    /// Connection established
    Connected,
    /// Connection dropped
    Disconnected,
    /// Reconnection attempt scheduled
    Reconnecting { attempt: u32 },
    /// Reconnect attempts exhausted
    GaveUp,
}

/// Connection state of the feed, observable for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedState {
    /// Not yet connected
    Idle,
    /// Receiving trades
    Connected,
    /// Dropped, a reconnect is pending
    Reconnecting { attempt: u32 },
    /// Reconnects exhausted; no more data until restart
    Down,
    /// Closed on request
    Closed,
}

impl FeedState {
    /// Whether new prices may still arrive
    pub fn is_live(&self) -> bool {
        !matches!(self, FeedState::Down | FeedState::Closed)
    }
}

impl std::fmt::Display for FeedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedState::Idle => write!(f, "idle"),
            FeedState::Connected => write!(f, "connected"),
            FeedState::Reconnecting { attempt } => write!(f, "reconnecting ({})", attempt),
            FeedState::Down => write!(f, "down"),
            FeedState::Closed => write!(f, "closed"),
        }
    }
}
