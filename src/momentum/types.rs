//! Price window types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Retention horizon of the price window in milliseconds (5 minutes)
pub const RETENTION_HORIZON_MS: i64 = 300_000;

/// A single observed trade price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch milliseconds at which the price was observed
    pub timestamp: i64,
    /// Trade price
    pub price: Decimal,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(timestamp: i64, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Momentum over a lookback window, derived on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumSample {
    /// Lookback window in seconds
    pub window_seconds: u64,
    /// Percentage change, e.g. 0.30 means +0.30%
    pub value: Decimal,
}
