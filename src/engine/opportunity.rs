//! Edge computation and proposal gating

use super::{EngineConfig, Proposal, Rejection};
use crate::model::{Estimate, Outcome};
use crate::quote::Quote;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Pure decision function over an estimate and a quote
///
/// Never talks to the execution side; it only returns a value.
#[derive(Debug, Clone)]
pub struct OpportunityEngine {
    config: EngineConfig,
}

impl OpportunityEngine {
    /// Create an engine with the given thresholds
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Edge in percentage points
    pub fn edge_pct(estimated: Decimal, quoted: Decimal) -> Decimal {
        (estimated - quoted) * dec!(100)
    }

    /// Limit price: quoted probability plus the bump, capped
    pub fn recommended_price(&self, quoted: Decimal) -> Decimal {
        (quoted + self.config.price_bump).min(self.config.max_price)
    }

    /// Decide, explaining any rejection
    pub fn assess(
        &self,
        estimate: &Estimate,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<Proposal, Rejection> {
        let outcome: Outcome = estimate.direction.outcome().ok_or(Rejection::NeutralSignal)?;

        if !quote.found {
            return Err(Rejection::QuoteNotFound);
        }

        let quoted = quote.probability(outcome);
        let edge_pct = Self::edge_pct(estimate.probability, quoted);

        if edge_pct < self.config.min_edge_pct {
            return Err(Rejection::EdgeTooSmall(edge_pct));
        }

        Ok(Proposal {
            id: Uuid::new_v4(),
            round_id: quote.round_id.clone(),
            outcome,
            edge_pct,
            estimated_probability: estimate.probability,
            quoted_probability: quoted,
            token: quote.token(outcome).to_string(),
            recommended_price: self.recommended_price(quoted),
            size_usdc: self.config.size_usdc,
            created_at: now,
        })
    }

    /// Proposal if the edge qualifies
    pub fn evaluate(&self, estimate: &Estimate, quote: &Quote, now: DateTime<Utc>) -> Option<Proposal> {
        self.assess(estimate, quote, now).ok()
    }
}

impl Default for OpportunityEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, LinearMomentumModel, ProbabilityModel};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 37, 12).unwrap()
    }

    fn quote(up: Decimal, down: Decimal) -> Quote {
        Quote {
            round_id: "btc-updown-15m-1705314600".to_string(),
            found: true,
            up_probability: up,
            down_probability: down,
            up_token: "up-token".to_string(),
            down_token: "down-token".to_string(),
            question: String::new(),
            expires_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 45, 0).unwrap(),
            fetched_at: now(),
        }
    }

    fn estimate(probability: Decimal, direction: Direction) -> Estimate {
        Estimate {
            probability,
            direction,
        }
    }

    #[test]
    fn test_end_to_end_up_proposal() {
        let estimate = LinearMomentumModel::new().estimate(dec!(0.30), dec!(0.15));
        let engine = OpportunityEngine::default();

        let proposal = engine
            .evaluate(&estimate, &quote(dec!(0.60), dec!(0.42)), now())
            .unwrap();

        assert_eq!(proposal.outcome, Outcome::Up);
        assert_eq!(proposal.edge_pct, dec!(25));
        assert_eq!(proposal.estimated_probability, dec!(0.85));
        assert_eq!(proposal.quoted_probability, dec!(0.60));
        assert_eq!(proposal.recommended_price, dec!(0.61));
        assert_eq!(proposal.token, "up-token");
        assert_eq!(proposal.size_usdc, dec!(50));
        assert_eq!(proposal.created_at, now());
    }

    #[test]
    fn test_down_uses_down_side() {
        let engine = OpportunityEngine::default();
        let proposal = engine
            .evaluate(
                &estimate(dec!(0.70), Direction::Down),
                &quote(dec!(0.20), dec!(0.55)),
                now(),
            )
            .unwrap();

        assert_eq!(proposal.outcome, Outcome::Down);
        assert_eq!(proposal.edge_pct, dec!(15));
        assert_eq!(proposal.token, "down-token");
        assert_eq!(proposal.recommended_price, dec!(0.56));
    }

    #[test]
    fn test_neutral_never_proposes() {
        let engine = OpportunityEngine::default();
        let result = engine.assess(&Estimate::neutral(), &quote(dec!(0.01), dec!(0.01)), now());
        assert_eq!(result.unwrap_err(), Rejection::NeutralSignal);
    }

    #[test]
    fn test_not_found_never_proposes() {
        let engine = OpportunityEngine::default();
        let mut q = quote(dec!(0.01), dec!(0.01));
        q.found = false;

        let result = engine.assess(&estimate(dec!(0.85), Direction::Up), &q, now());
        assert_eq!(result.unwrap_err(), Rejection::QuoteNotFound);
    }

    #[test]
    fn test_edge_below_minimum() {
        let engine = OpportunityEngine::default();
        let result = engine.assess(
            &estimate(dec!(0.64), Direction::Up),
            &quote(dec!(0.60), dec!(0.40)),
            now(),
        );
        assert_eq!(result.unwrap_err(), Rejection::EdgeTooSmall(dec!(4)));
    }

    #[test]
    fn test_edge_at_minimum_proposes() {
        let engine = OpportunityEngine::default();
        let proposal = engine.evaluate(
            &estimate(dec!(0.65), Direction::Up),
            &quote(dec!(0.60), dec!(0.40)),
            now(),
        );
        assert!(proposal.is_some());
    }

    #[test]
    fn test_recommended_price_capped() {
        let engine = OpportunityEngine::default();
        assert_eq!(engine.recommended_price(dec!(0.985)), dec!(0.99));
        assert_eq!(engine.recommended_price(dec!(0.40)), dec!(0.41));
    }

    #[test]
    fn test_negative_edge_rejected() {
        let engine = OpportunityEngine::default();
        let result = engine.assess(
            &estimate(dec!(0.55), Direction::Up),
            &quote(dec!(0.90), dec!(0.10)),
            now(),
        );
        assert_eq!(result.unwrap_err(), Rejection::EdgeTooSmall(dec!(-35)));
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::NeutralSignal.to_string(), "neutral signal");
        assert_eq!(Rejection::QuoteNotFound.to_string(), "quote not found");
        assert_eq!(
            Rejection::EdgeTooSmall(dec!(2.5)).to_string(),
            "edge too small (2.5%)"
        );
    }
}
