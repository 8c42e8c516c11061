//! Opportunity engine module
//!
//! Compares a model estimate with the market quote and decides whether the
//! edge is worth a trade proposal

mod opportunity;

pub use opportunity::OpportunityEngine;

use crate::model::Outcome;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Decision thresholds and order shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum edge in percentage points
    pub min_edge_pct: Decimal,
    /// Added to the quoted probability to cross the spread
    pub price_bump: Decimal,
    /// Ceiling on the recommended price
    pub max_price: Decimal,
    /// Proposal size in USDC
    pub size_usdc: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_edge_pct: dec!(5.0),
            price_bump: dec!(0.01),
            max_price: dec!(0.99),
            size_usdc: dec!(50),
        }
    }
}

/// A non-binding recommendation to buy one outcome of a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique proposal identifier
    pub id: Uuid,
    /// Round the proposal targets
    pub round_id: String,
    /// Outcome to buy
    pub outcome: Outcome,
    /// Estimated minus quoted probability, in percentage points
    pub edge_pct: Decimal,
    /// Model probability for the outcome
    pub estimated_probability: Decimal,
    /// Market probability for the outcome
    pub quoted_probability: Decimal,
    /// Outcome token
    pub token: String,
    /// Limit price
    pub recommended_price: Decimal,
    /// Size in USDC
    pub size_usdc: Decimal,
    /// Decision time
    pub created_at: DateTime<Utc>,
}

/// Why a tick produced no proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Momentum inside the noise band
    NeutralSignal,
    /// Provider had no market for the round
    QuoteNotFound,
    /// Edge below the configured minimum (carries the edge)
    EdgeTooSmall(Decimal),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NeutralSignal => write!(f, "neutral signal"),
            Rejection::QuoteNotFound => write!(f, "quote not found"),
            Rejection::EdgeTooSmall(edge) => write!(f, "edge too small ({edge}%)"),
        }
    }
}
