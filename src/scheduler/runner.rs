//! Tick loop

use super::{CooldownPolicy, Phase, SchedulerConfig, SchedulerStats, StatusSnapshot, TickOutcome};
use crate::clock::Clock;
use crate::config::ExecutionMode;
use crate::engine::{OpportunityEngine, Proposal, Rejection};
use crate::execution::{ExecutionEngine, Order};
use crate::feed::PriceStream;
use crate::model::{Estimate, LinearMomentumModel, ProbabilityModel};
use crate::quote::{Quote, QuoteSource};
use crate::round::format_time_left;
use crate::telemetry::{
    increment, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::FutureExt;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;

/// Single-threaded decision loop
///
/// Ticks never overlap: `run` awaits each tick before scheduling the next.
/// Statistics live here and are only touched from within a tick.
pub struct Scheduler {
    prices: Arc<PriceStream>,
    quotes: Arc<QuoteSource>,
    model: Box<dyn ProbabilityModel>,
    engine: OpportunityEngine,
    executor: Arc<dyn ExecutionEngine>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    stats: SchedulerStats,
    phase: Phase,
    last_status: Option<StatusSnapshot>,
}

impl Scheduler {
    /// Create a scheduler using the linear momentum model
    pub fn new(
        prices: Arc<PriceStream>,
        quotes: Arc<QuoteSource>,
        engine: OpportunityEngine,
        executor: Arc<dyn ExecutionEngine>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        let stats = SchedulerStats::new(clock.now());
        Self {
            prices,
            quotes,
            model: Box::new(LinearMomentumModel::new()),
            engine,
            executor,
            clock,
            config,
            stats,
            phase: Phase::WarmingUp,
            last_status: None,
        }
    }

    /// Replace the probability model
    pub fn with_model(mut self, model: Box<dyn ProbabilityModel>) -> Self {
        self.model = model;
        self
    }

    /// Current loop state
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Statistics so far
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Most recent status snapshot
    pub fn last_status(&self) -> Option<&StatusSnapshot> {
        self.last_status.as_ref()
    }

    /// Loop configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run until `shutdown` resolves, then stop and return final statistics
    ///
    /// Shutdown interrupts the warm-up, a backoff sleep or an in-flight tick.
    pub async fn run<F>(&mut self, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            warmup_secs = self.config.warmup.as_secs(),
            mode = %self.config.mode,
            "Warming up price window"
        );
        tokio::select! {
            biased;
            _ = &mut shutdown => return self.stop(),
            _ = tokio::time::sleep(self.config.warmup) => {}
        }

        self.phase = Phase::Idle;
        tracing::info!("Scheduler started");

        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = AssertUnwindSafe(self.tick()).catch_unwind() => result,
            };

            let error = match result {
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            self.stats.tick_errors += 1;
            self.phase = Phase::Idle;
            increment(CounterMetric::TickErrors);
            tracing::error!(
                error = %error,
                backoff_secs = self.config.error_backoff.as_secs(),
                "Tick failed, backing off"
            );

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.config.error_backoff) => {}
            }
            interval.reset();
        }

        self.stop()
    }

    /// Evaluate once and dispatch any proposal that passes the cooldown gate
    pub async fn tick(&mut self) -> anyhow::Result<TickOutcome> {
        if self.phase == Phase::Stopped {
            anyhow::bail!("scheduler is stopped");
        }

        let started = Instant::now();
        self.phase = Phase::Evaluating;
        let now = self.clock.now();

        let price = self.prices.current_price().await;
        let momentum = self.prices.momentum(self.config.momentum_window_secs).await;

        let quote_started = Instant::now();
        let quote = self.quotes.get_quote().await;
        record_latency(LatencyMetric::QuoteFetch, quote_started.elapsed());

        let estimate = momentum.map(|m| self.model.estimate(m, self.config.momentum_threshold_pct));
        let decision = match &estimate {
            Some(estimate) => self.engine.assess(estimate, &quote, now),
            None => Err(Rejection::NeutralSignal),
        };

        if self.status_due(now) {
            self.emit_status(now, price, momentum, estimate, &quote);
        }

        let outcome = match decision {
            Err(_) if estimate.is_none() => TickOutcome::NoMomentum,
            Err(reason) => {
                tracing::trace!(%reason, "No proposal");
                TickOutcome::NoSignal(reason)
            }
            Ok(proposal) => match self.cooldown_remaining(now) {
                Some(remaining) => {
                    self.phase = Phase::Cooling;
                    increment(CounterMetric::CooldownSkips);
                    tracing::debug!(
                        remaining_secs = remaining.num_seconds(),
                        edge_pct = %proposal.edge_pct,
                        "Proposal held back by cooldown"
                    );
                    TickOutcome::Cooling { remaining }
                }
                None => {
                    self.phase = Phase::Proposing;
                    self.dispatch(proposal, now).await
                }
            },
        };

        self.stats.ticks += 1;
        self.phase = Phase::Idle;
        record_latency(LatencyMetric::Tick, started.elapsed());

        Ok(outcome)
    }

    /// Stop the loop, close the price stream and log final statistics
    ///
    /// Idempotent.
    pub fn stop(&mut self) -> SchedulerStats {
        if self.phase != Phase::Stopped {
            self.phase = Phase::Stopped;
            self.prices.disconnect();

            let now = self.clock.now();
            tracing::info!(
                runtime_minutes = %format!("{:.1}", self.stats.runtime_minutes(now)),
                opportunities = self.stats.opportunity_count,
                trades = self.stats.trade_count,
                failed_executions = self.stats.failed_executions,
                tick_errors = self.stats.tick_errors,
                "Scheduler stopped"
            );
        }
        self.stats.clone()
    }

    /// Time until the cooldown gate opens, `None` if open
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<ChronoDuration> {
        let last = self.stats.last_proposal_at?;
        let elapsed = now - last;
        (elapsed < self.config.cooldown).then(|| self.config.cooldown - elapsed)
    }

    async fn dispatch(&mut self, proposal: Proposal, now: DateTime<Utc>) -> TickOutcome {
        self.stats.opportunity_count += 1;
        increment(CounterMetric::Opportunities);

        tracing::info!(
            round = %proposal.round_id,
            outcome = %proposal.outcome,
            edge_pct = %proposal.edge_pct.round_dp(2),
            estimated = %proposal.estimated_probability,
            quoted = %proposal.quoted_probability,
            price = %proposal.recommended_price,
            size_usdc = %proposal.size_usdc,
            "Opportunity found"
        );

        if self.config.mode == ExecutionMode::Simulate {
            tracing::info!(proposal_id = %proposal.id, "Simulation mode, order not placed");
            return TickOutcome::Simulated(proposal);
        }

        let order = Order::from(&proposal);
        let submitted = Instant::now();
        let result = tokio::time::timeout(
            self.config.execution_timeout,
            self.executor.submit_order(order),
        )
        .await;
        record_latency(LatencyMetric::OrderSubmission, submitted.elapsed());

        let result = match result {
            Ok(inner) => inner,
            Err(_) => Err(anyhow::anyhow!(
                "execution timed out after {:?}",
                self.config.execution_timeout
            )),
        };

        match result {
            Ok(order_id) => {
                self.stats.trade_count += 1;
                self.stats.last_proposal_at = Some(now);
                increment(CounterMetric::Trades);
                tracing::info!(%order_id, trades = self.stats.trade_count, "Order placed");
                TickOutcome::Executed { proposal, order_id }
            }
            Err(e) => {
                self.stats.failed_executions += 1;
                if self.config.cooldown_policy == CooldownPolicy::Always {
                    self.stats.last_proposal_at = Some(now);
                }
                increment(CounterMetric::FailedExecutions);
                tracing::warn!(
                    error = %e,
                    policy = ?self.config.cooldown_policy,
                    "Execution failed"
                );
                TickOutcome::ExecutionFailed {
                    proposal,
                    error: e.to_string(),
                }
            }
        }
    }

    fn status_due(&self, now: DateTime<Utc>) -> bool {
        match &self.last_status {
            Some(last) => now - last.at >= self.config.status_interval,
            None => true,
        }
    }

    fn emit_status(
        &mut self,
        now: DateTime<Utc>,
        price: Option<Decimal>,
        momentum: Option<Decimal>,
        estimate: Option<Estimate>,
        quote: &Quote,
    ) {
        let edge_pct = estimate.and_then(|e| {
            e.direction
                .outcome()
                .map(|o| OpportunityEngine::edge_pct(e.probability, quote.probability(o)))
        });

        let snapshot = StatusSnapshot {
            at: now,
            phase: self.phase,
            feed: self.prices.state(),
            price,
            momentum_pct: momentum,
            estimate,
            round_id: quote.round_id.clone(),
            quote_found: quote.found,
            up_probability: quote.up_probability,
            down_probability: quote.down_probability,
            time_left: format_time_left(quote.time_left(now)),
            edge_pct,
            opportunity_count: self.stats.opportunity_count,
            trade_count: self.stats.trade_count,
            failed_executions: self.stats.failed_executions,
        };

        tracing::info!(
            feed = %snapshot.feed,
            price = ?snapshot.price,
            momentum_pct = ?snapshot.momentum_pct.map(|m| m.round_dp(4)),
            direction = ?snapshot.estimate.map(|e| e.direction),
            round = %snapshot.round_id,
            found = snapshot.quote_found,
            up = %snapshot.up_probability,
            down = %snapshot.down_probability,
            time_left = %snapshot.time_left,
            edge_pct = ?snapshot.edge_pct.map(|e| e.round_dp(2)),
            opportunities = snapshot.opportunity_count,
            trades = snapshot.trade_count,
            "Status"
        );

        if let Some(p) = price.and_then(|p| p.to_f64()) {
            set_gauge(GaugeMetric::Price, p);
        }
        if let Some(m) = momentum.and_then(|m| m.to_f64()) {
            set_gauge(GaugeMetric::MomentumPct, m);
        }
        if let Some(e) = edge_pct.and_then(|e| e.to_f64()) {
            set_gauge(GaugeMetric::EdgePct, e);
        }
        if let Some(up) = quote.up_probability.to_f64() {
            set_gauge(GaugeMetric::UpProbability, up);
        }
        if let Some(down) = quote.down_probability.to_f64() {
            set_gauge(GaugeMetric::DownProbability, down);
        }

        self.last_status = Some(snapshot);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic".to_string()
    }
}
