//! Probability model module
//!
//! Maps price momentum to an estimated probability for the round outcome

mod linear;

pub use linear::LinearMomentumModel;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional call derived from momentum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Price expected to finish above the round open
    Up,
    /// Price expected to finish below the round open
    Down,
    /// Momentum within the noise band
    Neutral,
}

impl Direction {
    /// Tradable outcome for this call, `None` when neutral
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Direction::Up => Some(Outcome::Up),
            Direction::Down => Some(Outcome::Down),
            Direction::Neutral => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// One side of a binary up/down market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Up,
    Down,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Up => write!(f, "UP"),
            Outcome::Down => write!(f, "DOWN"),
        }
    }
}

/// Model output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Estimated probability of the called direction
    pub probability: Decimal,
    /// Directional call
    pub direction: Direction,
}

impl Estimate {
    /// Uninformative estimate: neutral at 50%
    pub fn neutral() -> Self {
        Self {
            probability: crate::quote::NEUTRAL_PROBABILITY,
            direction: Direction::Neutral,
        }
    }
}

/// Trait for probability model implementations
pub trait ProbabilityModel: Send + Sync {
    /// Estimate outcome probability from momentum (percent) and a noise
    /// threshold (percent)
    fn estimate(&self, momentum: Decimal, threshold: Decimal) -> Estimate;
}
