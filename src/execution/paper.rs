//! Paper trading execution engine

use super::{ExecutionEngine, Fill, Order, OrderId};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Paper trading execution engine with simulated fills
///
/// Orders fill immediately at their limit price. Orders without a token or
/// with a price outside (0, 1) are refused, as the exchange would.
pub struct PaperEngine {
    fee_rate: Decimal,
    fills: Arc<RwLock<Vec<Fill>>>,
}

impl PaperEngine {
    /// Create a new paper trading engine
    pub fn new(fee_rate: Decimal) -> Self {
        Self {
            fee_rate,
            fills: Arc::new(RwLock::new(vec![])),
        }
    }
}

#[async_trait]
impl ExecutionEngine for PaperEngine {
    async fn submit_order(&self, order: Order) -> anyhow::Result<OrderId> {
        if order.token_id.is_empty() {
            anyhow::bail!("order has no token id");
        }
        if order.price <= Decimal::ZERO || order.price >= Decimal::ONE {
            anyhow::bail!("order price {} outside (0, 1)", order.price);
        }

        let order_id = OrderId::new_v4();
        let fill = Fill {
            order_id,
            shares: order.size_usdc / order.price,
            fees: order.size_usdc * self.fee_rate,
            token_id: order.token_id,
            outcome: order.outcome,
            price: order.price,
            size_usdc: order.size_usdc,
            timestamp: Utc::now(),
        };

        let mut fills = self.fills.write().await;
        fills.push(fill);

        tracing::info!(?order_id, outcome = %order.outcome, price = %order.price, "Paper order filled");
        Ok(order_id)
    }

    async fn get_fills(&self) -> anyhow::Result<Vec<Fill>> {
        let fills = self.fills.read().await;
        Ok(fills.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    fn order(token: &str, outcome: Outcome, price: Decimal) -> Order {
        Order {
            token_id: token.to_string(),
            outcome,
            price,
            size_usdc: dec!(10),
        }
    }

    #[tokio::test]
    async fn test_paper_engine_fill() {
        let engine = PaperEngine::new(dec!(0.001));

        let order_id = assert_ok!(
            engine
                .submit_order(order("up-token", Outcome::Up, dec!(0.50)))
                .await
        );
        let fills = engine.get_fills().await.unwrap();

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].order_id, order_id);
        assert_eq!(fills[0].shares, dec!(20));
        assert_eq!(fills[0].fees, dec!(0.01)); // 10 * 0.001
    }

    #[tokio::test]
    async fn test_paper_engine_multiple_orders() {
        let engine = PaperEngine::new(dec!(0));

        engine
            .submit_order(order("up-token", Outcome::Up, dec!(0.61)))
            .await
            .unwrap();
        engine
            .submit_order(order("down-token", Outcome::Down, dec!(0.45)))
            .await
            .unwrap();

        let fills = engine.get_fills().await.unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].outcome, Outcome::Up);
        assert_eq!(fills[1].outcome, Outcome::Down);
        assert_eq!(fills[1].fees, dec!(0));
    }

    #[tokio::test]
    async fn test_paper_engine_rejects_empty_token() {
        let engine = PaperEngine::new(dec!(0));
        assert_err!(engine.submit_order(order("", Outcome::Up, dec!(0.5))).await);
        assert!(engine.get_fills().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_paper_engine_rejects_bad_price() {
        let engine = PaperEngine::new(dec!(0));

        assert_err!(engine.submit_order(order("t", Outcome::Up, dec!(0))).await);
        assert_err!(engine.submit_order(order("t", Outcome::Up, dec!(1))).await);
    }
}
