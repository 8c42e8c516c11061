//! Linear momentum confidence ramp
//!
//! P = min(0.85, 0.55 + (|momentum| / threshold) * 0.15) outside the noise
//! band, 0.5 inside it.

use super::{Direction, Estimate, ProbabilityModel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Probability at the edge of the noise band
const BASE_PROBABILITY: Decimal = dec!(0.55);
/// Probability added per threshold multiple of momentum
const SLOPE: Decimal = dec!(0.15);
/// Upper bound on any estimate
const MAX_PROBABILITY: Decimal = dec!(0.85);

/// Fixed linear heuristic, not a calibrated estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearMomentumModel;

impl LinearMomentumModel {
    /// Create a new linear model
    pub fn new() -> Self {
        Self
    }
}

impl ProbabilityModel for LinearMomentumModel {
    fn estimate(&self, momentum: Decimal, threshold: Decimal) -> Estimate {
        // A non-positive threshold has no noise band to scale against
        if threshold <= Decimal::ZERO {
            return Estimate::neutral();
        }

        let direction = if momentum > threshold {
            Direction::Up
        } else if momentum < -threshold {
            Direction::Down
        } else {
            return Estimate::neutral();
        };

        let probability = (BASE_PROBABILITY + momentum.abs() / threshold * SLOPE).min(MAX_PROBABILITY);

        Estimate {
            probability,
            direction,
        }
    }
}
