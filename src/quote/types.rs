//! Quote types

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::Outcome;

/// Neutral prior used when a probability is unknown
pub const NEUTRAL_PROBABILITY: Decimal = dec!(0.5);

/// A round's market as reported by the quote provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundMarket {
    /// Market slug (the round identifier)
    pub slug: String,
    /// Market question
    pub question: String,
    /// Condition identifier
    pub condition_id: String,
    /// Token for the "up" outcome, empty if unknown
    pub up_token: String,
    /// Token for the "down" outcome, empty if unknown
    pub down_token: String,
    /// Implied probability of "up"
    pub up_price: Decimal,
    /// Implied probability of "down"
    pub down_price: Decimal,
    /// Round end time
    pub end_time: DateTime<Utc>,
    /// Open for trading (`active && !closed`)
    pub active: bool,
}

/// Market-implied probabilities and tokens for one round
///
/// Replaced wholesale on refresh. `up_probability + down_probability` need
/// not sum to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Round identifier (market slug)
    pub round_id: String,
    /// Whether the provider returned a market for the round
    pub found: bool,
    /// Implied probability of "up", in [0, 1]
    pub up_probability: Decimal,
    /// Implied probability of "down", in [0, 1]
    pub down_probability: Decimal,
    /// Token for the "up" outcome
    pub up_token: String,
    /// Token for the "down" outcome
    pub down_token: String,
    /// Market question, empty when not found
    pub question: String,
    /// When the round ends
    pub expires_at: DateTime<Utc>,
    /// When the quote was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Quote built from a provider market
    pub fn from_market(market: RoundMarket, fetched_at: DateTime<Utc>) -> Self {
        Self {
            round_id: market.slug,
            found: true,
            up_probability: market.up_price,
            down_probability: market.down_price,
            up_token: market.up_token,
            down_token: market.down_token,
            question: market.question,
            expires_at: market.end_time,
            fetched_at,
        }
    }

    /// Fail-open quote: not found, neutral prior on both sides, no tokens
    pub fn not_found(
        round_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            round_id: round_id.into(),
            found: false,
            up_probability: NEUTRAL_PROBABILITY,
            down_probability: NEUTRAL_PROBABILITY,
            up_token: String::new(),
            down_token: String::new(),
            question: String::new(),
            expires_at,
            fetched_at,
        }
    }

    /// Quoted probability for an outcome
    pub fn probability(&self, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Up => self.up_probability,
            Outcome::Down => self.down_probability,
        }
    }

    /// Token for an outcome
    pub fn token(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Up => &self.up_token,
            Outcome::Down => &self.down_token,
        }
    }

    /// Time until the round ends
    pub fn time_left(&self, now: DateTime<Utc>) -> Option<Duration> {
        let left = self.expires_at - now;
        (left > Duration::zero()).then_some(left)
    }
}

/// Quote provider errors
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    /// Transport-level failure
    #[error("Quote provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("Quote provider error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Response could not be interpreted
    #[error("Invalid quote provider response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn market() -> RoundMarket {
        RoundMarket {
            slug: "btc-updown-15m-1705312800".to_string(),
            question: "Bitcoin Up or Down".to_string(),
            condition_id: "0xabc".to_string(),
            up_token: "up-token".to_string(),
            down_token: "down-token".to_string(),
            up_price: dec!(0.62),
            down_price: dec!(0.40),
            end_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 15, 0).unwrap(),
            active: true,
        }
    }

    #[test]
    fn test_quote_from_market() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 5, 0).unwrap();
        let quote = Quote::from_market(market(), now);

        assert!(quote.found);
        assert_eq!(quote.probability(Outcome::Up), dec!(0.62));
        assert_eq!(quote.probability(Outcome::Down), dec!(0.40));
        assert_eq!(quote.token(Outcome::Up), "up-token");
        assert_eq!(quote.token(Outcome::Down), "down-token");
        assert_eq!(quote.time_left(now), Some(Duration::minutes(10)));
    }

    #[test]
    fn test_not_found_is_neutral() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 5, 0).unwrap();
        let quote = Quote::not_found("btc-updown-15m-1705312800", now, now);

        assert!(!quote.found);
        assert_eq!(quote.up_probability, dec!(0.5));
        assert_eq!(quote.down_probability, dec!(0.5));
        assert!(quote.up_token.is_empty());
        assert!(quote.down_token.is_empty());
        assert_eq!(quote.time_left(now), None);
    }

    #[test]
    fn test_quote_error_display() {
        let err = QuoteError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Quote provider error: 503 - unavailable");
    }
}
