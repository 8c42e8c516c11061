//! Bounded, time-ordered price buffer
//!
//! Holds the last five minutes of trade prices for one asset and computes
//! momentum against the most recent price at or before a lookback cutoff.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::types::{MomentumSample, PricePoint, RETENTION_HORIZON_MS};

/// Price history ordered ascending by timestamp
///
/// After every ingest all retained points satisfy
/// `timestamp > now - retention_ms`.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    points: VecDeque<PricePoint>,
    retention_ms: i64,
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceWindow {
    /// Create a window with the default five minute retention
    pub fn new() -> Self {
        Self::with_retention(RETENTION_HORIZON_MS)
    }

    /// Create a window with a custom retention horizon
    pub fn with_retention(retention_ms: i64) -> Self {
        Self {
            points: VecDeque::new(),
            retention_ms,
        }
    }

    /// Add a price observation and prune everything outside the horizon
    ///
    /// Non-positive prices are dropped. Returns whether the point was kept.
    pub fn ingest(&mut self, point: PricePoint, now_ms: i64) -> bool {
        let accepted = point.price > Decimal::ZERO;

        if accepted {
            match self.points.back() {
                Some(last) if last.timestamp > point.timestamp => {
                    // Late arrival: keep ascending order
                    let idx = self
                        .points
                        .partition_point(|p| p.timestamp <= point.timestamp);
                    self.points.insert(idx, point);
                }
                _ => self.points.push_back(point),
            }
        }

        self.prune(now_ms);
        accepted && point.timestamp > now_ms - self.retention_ms
    }

    /// Drop every point with `timestamp <= now - retention`
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        while let Some(front) = self.points.front() {
            if front.timestamp <= cutoff {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// Most recent observation
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Most recent price
    pub fn current_price(&self) -> Option<Decimal> {
        self.latest().map(|p| p.price)
    }

    /// Percentage change from the reference price to the latest price
    ///
    /// The reference is the latest point with `timestamp <= now - window`.
    /// Unavailable with fewer than two points or without history reaching
    /// back to the cutoff.
    pub fn momentum(&self, window_seconds: u64, now_ms: i64) -> Option<Decimal> {
        if self.points.len() < 2 {
            return None;
        }

        let cutoff = now_ms - (window_seconds as i64) * 1000;
        let reference = self.points.iter().rev().find(|p| p.timestamp <= cutoff)?;
        let latest = self.points.back()?;

        if reference.price.is_zero() {
            return None;
        }

        Some((latest.price - reference.price) / reference.price * Decimal::ONE_HUNDRED)
    }

    /// Momentum wrapped with its window
    pub fn momentum_sample(&self, window_seconds: u64, now_ms: i64) -> Option<MomentumSample> {
        self.momentum(window_seconds, now_ms)
            .map(|value| MomentumSample {
                window_seconds,
                value,
            })
    }

    /// Number of retained points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the window holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate retained points oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// Oldest retained timestamp
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.points.front().map(|p| p.timestamp)
    }
}
