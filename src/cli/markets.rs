//! Markets command implementation

use crate::config::Config;
use crate::quote::GammaClient;
use crate::round::format_time_left;
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Asset symbol (defaults to the configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,

    /// Maximum rounds to print
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

impl MarketsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let asset = self.asset.as_deref().unwrap_or(&config.market.asset);
        let client = GammaClient::with_config(config.gamma_config())?;

        let rounds = client
            .fetch_open_rounds(asset, config.market.round_duration_secs)
            .await?;

        if rounds.is_empty() {
            println!("No open rounds for {}", asset);
            return Ok(());
        }

        let now = Utc::now();
        for market in rounds.iter().take(self.limit) {
            let left = market.end_time - now;
            println!(
                "{}  up={} down={}  {}{}",
                market.slug,
                market.up_price,
                market.down_price,
                format_time_left((left > chrono::Duration::zero()).then_some(left)),
                if market.active { "" } else { "  (closed)" }
            );
        }

        Ok(())
    }
}
