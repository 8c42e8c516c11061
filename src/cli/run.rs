//! Run command implementation

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, ExecutionMode};
use crate::engine::OpportunityEngine;
use crate::execution::{ExecutionEngine, PaperEngine};
use crate::feed::{BinanceFeed, PriceStream};
use crate::momentum::PriceWindow;
use crate::quote::{GammaClient, QuoteSource};
use crate::round::RoundWindowResolver;
use crate::scheduler::Scheduler;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured execution mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ExecutionMode>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(mode) = self.mode {
            config.execution.mode = mode;
        }

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let feed = BinanceFeed::new(config.feed_symbol())
            .with_base_url(config.feed.ws_url.clone())
            .with_reconnect(config.reconnect_policy());
        let window = PriceWindow::with_retention(config.feed.retention_secs as i64 * 1000);
        let prices = Arc::new(PriceStream::with_window(clock.clone(), window));
        prices.connect(&feed).await?;

        let provider = Arc::new(GammaClient::with_config(config.gamma_config())?);
        let quotes = Arc::new(
            QuoteSource::new(
                provider,
                RoundWindowResolver::new(config.market.round_duration_secs),
                config.market.asset.clone(),
                clock.clone(),
            )
            .with_ttl(chrono::Duration::seconds(config.market.quote_ttl_secs as i64)),
        );

        let executor: Arc<dyn ExecutionEngine> = Arc::new(PaperEngine::new(config.execution.fee_rate));

        tracing::info!(
            asset = %config.market.asset,
            symbol = %config.feed_symbol(),
            mode = %config.execution.mode,
            min_edge_pct = %config.strategy.min_edge_pct,
            bet_size_usdc = %config.strategy.bet_size_usdc,
            momentum_window_secs = config.strategy.momentum_window_secs,
            "Starting updown-edge"
        );

        let mut scheduler = Scheduler::new(
            prices,
            quotes,
            OpportunityEngine::new(config.engine_config()),
            executor.clone(),
            clock,
            config.scheduler_config(),
        );

        let stats = scheduler.run(shutdown_signal()).await;

        if config.execution.mode == ExecutionMode::Paper {
            let fills = executor.get_fills().await?;
            tracing::info!(fills = fills.len(), "Paper fills recorded");
        }

        println!("Runtime: {:.1} minutes", stats.runtime_minutes(chrono::Utc::now()));
        println!("Opportunities: {}", stats.opportunity_count);
        println!("Trades: {}", stats.trade_count);
        println!("Failed executions: {}", stats.failed_executions);

        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            // Without a signal handler the loop can only be killed externally
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
