//! Prometheus metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op, so library code can record unconditionally.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One scheduler tick, end to end
    Tick,
    /// Quote resolution including cache
    QuoteFetch,
    /// Execution collaborator round trip
    OrderSubmission,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Last reference price
    Price,
    /// Momentum over the configured window, percent
    MomentumPct,
    /// Edge on the called outcome, percentage points
    EdgePct,
    /// Quoted probability of "up"
    UpProbability,
    /// Quoted probability of "down"
    DownProbability,
    /// Points held in the price window
    WindowPoints,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Proposals emitted by the engine
    Opportunities,
    /// Successful executions
    Trades,
    /// Failed or timed-out executions
    FailedExecutions,
    /// Proposals suppressed by the cooldown gate
    CooldownSkips,
    /// Ticks that raised an error
    TickErrors,
    /// Quote provider failures
    QuoteErrors,
    /// Rounds with no market
    QuoteNotFound,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::Tick => "updown_tick_latency_ms",
            LatencyMetric::QuoteFetch => "updown_quote_fetch_latency_ms",
            LatencyMetric::OrderSubmission => "updown_order_submission_latency_ms",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::Price => "updown_price",
            GaugeMetric::MomentumPct => "updown_momentum_pct",
            GaugeMetric::EdgePct => "updown_edge_pct",
            GaugeMetric::UpProbability => "updown_quote_up_probability",
            GaugeMetric::DownProbability => "updown_quote_down_probability",
            GaugeMetric::WindowPoints => "updown_window_points",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::Opportunities => "updown_opportunities_total",
            CounterMetric::Trades => "updown_trades_total",
            CounterMetric::FailedExecutions => "updown_failed_executions_total",
            CounterMetric::CooldownSkips => "updown_cooldown_skips_total",
            CounterMetric::TickErrors => "updown_tick_errors_total",
            CounterMetric::QuoteErrors => "updown_quote_errors_total",
            CounterMetric::QuoteNotFound => "updown_quote_not_found_total",
        }
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    gauge!(metric.name()).set(value);
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    counter!(metric.name()).increment(1);
}
