//! Price feed module
//!
//! Streams trade prices from Binance into a bounded price window

mod binance;
mod stream;
mod types;

pub use binance::{BinanceFeed, BINANCE_WS_URL};
pub use stream::PriceStream;
pub use types::{FeedEvent, FeedState, PriceTick};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for price feed implementations
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Subscribe to trade and connection events
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedEvent>>;
}
