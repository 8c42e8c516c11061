//! Scheduler module
//!
//! Drives the decision loop: one evaluation per tick, a cooldown gate in
//! front of dispatch, periodic status snapshots and final statistics.

mod runner;

pub use runner::Scheduler;

use crate::config::ExecutionMode;
use crate::engine::{Proposal, Rejection};
use crate::execution::OrderId;
use crate::feed::FeedState;
use crate::model::Estimate;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the price window to fill
    WarmingUp,
    /// Between ticks
    Idle,
    /// Computing estimate, quote and decision
    Evaluating,
    /// A proposal was held back by the cooldown gate
    Cooling,
    /// Handing a proposal to execution
    Proposing,
    /// Terminal
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::WarmingUp => "warming_up",
            Phase::Idle => "idle",
            Phase::Evaluating => "evaluating",
            Phase::Cooling => "cooling",
            Phase::Proposing => "proposing",
            Phase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Whether a failed execution restarts the cooldown timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownPolicy {
    /// Restart after every dispatched proposal, failed or not
    #[default]
    Always,
    /// Restart only after a successful execution, so failures retry next tick
    OnSuccess,
}

/// Loop timing and decision parameters
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between ticks
    pub tick_interval: Duration,
    /// Settle delay before the first tick
    pub warmup: Duration,
    /// Minimum spacing of status snapshots
    pub status_interval: ChronoDuration,
    /// Sleep after a failed tick
    pub error_backoff: Duration,
    /// Minimum spacing of accepted proposals
    pub cooldown: ChronoDuration,
    /// Cooldown behavior on execution failure
    pub cooldown_policy: CooldownPolicy,
    /// Momentum lookback in seconds
    pub momentum_window_secs: u64,
    /// Noise band for the probability model, percent
    pub momentum_threshold_pct: Decimal,
    /// Simulate or paper-execute proposals
    pub mode: ExecutionMode,
    /// Upper bound on one execution call
    pub execution_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            warmup: Duration::from_secs(35),
            status_interval: ChronoDuration::seconds(5),
            error_backoff: Duration::from_secs(5),
            cooldown: ChronoDuration::seconds(60),
            cooldown_policy: CooldownPolicy::Always,
            momentum_window_secs: 30,
            momentum_threshold_pct: dec!(0.15),
            mode: ExecutionMode::Simulate,
            execution_timeout: Duration::from_secs(10),
        }
    }
}

/// Process-lifetime counters, owned by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// When the scheduler was created
    pub started_at: DateTime<Utc>,
    /// Last time the cooldown timer was restarted
    pub last_proposal_at: Option<DateTime<Utc>>,
    /// Proposals that passed the cooldown gate
    pub opportunity_count: u64,
    /// Successful executions
    pub trade_count: u64,
    /// Failed or timed-out executions
    pub failed_executions: u64,
    /// Completed ticks
    pub ticks: u64,
    /// Ticks that failed
    pub tick_errors: u64,
}

impl SchedulerStats {
    /// Fresh statistics starting at `started_at`
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            last_proposal_at: None,
            opportunity_count: 0,
            trade_count: 0,
            failed_executions: 0,
            ticks: 0,
            tick_errors: 0,
        }
    }

    /// Runtime in minutes as of `now`
    pub fn runtime_minutes(&self, now: DateTime<Utc>) -> f64 {
        (now - self.started_at).num_milliseconds() as f64 / 60_000.0
    }
}

/// Result of one tick
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Not enough price history for momentum
    NoMomentum,
    /// Evaluated, nothing worth proposing
    NoSignal(Rejection),
    /// A proposal was held back; `remaining` until the gate opens
    Cooling { remaining: ChronoDuration },
    /// Simulation mode: proposal logged, not executed
    Simulated(Proposal),
    /// Proposal executed
    Executed { proposal: Proposal, order_id: OrderId },
    /// Execution failed or timed out
    ExecutionFailed { proposal: Proposal, error: String },
}

impl TickOutcome {
    /// Proposal carried by this outcome, if any
    pub fn proposal(&self) -> Option<&Proposal> {
        match self {
            TickOutcome::Simulated(p)
            | TickOutcome::Executed { proposal: p, .. }
            | TickOutcome::ExecutionFailed { proposal: p, .. } => Some(p),
            _ => None,
        }
    }
}

/// Periodic observability record
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Snapshot time
    pub at: DateTime<Utc>,
    /// Loop state when the snapshot was taken
    pub phase: Phase,
    /// Price feed connection state
    pub feed: FeedState,
    /// Last reference price
    pub price: Option<Decimal>,
    /// Momentum over the configured window, percent
    pub momentum_pct: Option<Decimal>,
    /// Model output, if momentum was available
    pub estimate: Option<Estimate>,
    /// Quoted round
    pub round_id: String,
    /// Whether the round has a market
    pub quote_found: bool,
    /// Quoted probability of "up"
    pub up_probability: Decimal,
    /// Quoted probability of "down"
    pub down_probability: Decimal,
    /// Time left in the quoted round, e.g. `7m 48s`
    pub time_left: String,
    /// Edge on the called outcome, percentage points
    pub edge_pct: Option<Decimal>,
    /// Counters at snapshot time
    pub opportunity_count: u64,
    pub trade_count: u64,
    pub failed_executions: u64,
}
