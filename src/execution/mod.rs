//! Execution engine module
//!
//! Receives accepted proposals as limit orders. Only a paper engine is
//! provided; signing and live submission live outside this crate.

mod paper;
mod types;

pub use paper::PaperEngine;
pub use types::{Fill, Order, OrderId};

use async_trait::async_trait;

/// Trait for execution engine implementations
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Submit an order; an error means the order was not placed
    async fn submit_order(&self, order: Order) -> anyhow::Result<OrderId>;
    /// Get all fills
    async fn get_fills(&self) -> anyhow::Result<Vec<Fill>>;
}
