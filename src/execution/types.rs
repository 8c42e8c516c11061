//! Execution types

use crate::engine::Proposal;
use crate::model::Outcome;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order identifier
pub type OrderId = Uuid;

/// A limit buy for one outcome token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Outcome token identifier
    pub token_id: String,
    /// Outcome being bought
    pub outcome: Outcome,
    /// Limit price (probability units)
    pub price: Decimal,
    /// Notional in USDC
    pub size_usdc: Decimal,
}

impl From<&Proposal> for Order {
    fn from(proposal: &Proposal) -> Self {
        Self {
            token_id: proposal.token.clone(),
            outcome: proposal.outcome,
            price: proposal.recommended_price,
            size_usdc: proposal.size_usdc,
        }
    }
}

/// A fill (executed trade)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// Order ID
    pub order_id: OrderId,
    /// Token ID
    pub token_id: String,
    /// Outcome bought
    pub outcome: Outcome,
    /// Fill price
    pub price: Decimal,
    /// Notional in USDC
    pub size_usdc: Decimal,
    /// Outcome shares received
    pub shares: Decimal,
    /// Fill timestamp
    pub timestamp: DateTime<Utc>,
    /// Fees paid
    pub fees: Decimal,
}
