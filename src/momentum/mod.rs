//! Momentum module
//!
//! Keeps a bounded window of recent trade prices and derives percentage
//! momentum over a lookback window from it.

mod types;
mod window;

pub use types::{MomentumSample, PricePoint, RETENTION_HORIZON_MS};
pub use window::PriceWindow;
