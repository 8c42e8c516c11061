//! Quote command implementation

use crate::clock::SystemClock;
use crate::config::Config;
use crate::quote::{GammaClient, QuoteSource};
use crate::round::{format_time_left, RoundWindowResolver};
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Asset symbol (defaults to the configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,
}

impl QuoteArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let asset = self.asset.clone().unwrap_or_else(|| config.market.asset.clone());
        let source = QuoteSource::new(
            Arc::new(GammaClient::with_config(config.gamma_config())?),
            RoundWindowResolver::new(config.market.round_duration_secs),
            asset,
            Arc::new(SystemClock),
        );

        let quote = source.get_quote().await;

        println!("Round:    {}", quote.round_id);
        if !quote.found {
            println!("  No market found (neutral prior)");
            return Ok(());
        }
        println!("  {}", quote.question);
        println!("  Up:     {} ({})", quote.up_probability, quote.up_token);
        println!("  Down:   {} ({})", quote.down_probability, quote.down_token);
        println!("  Ends:   {}", quote.expires_at);
        println!("  Left:   {}", format_time_left(quote.time_left(Utc::now())));

        Ok(())
    }
}
