//! Round command implementation

use crate::config::Config;
use crate::round::{format_time_left, RoundWindowResolver};
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub struct RoundArgs {
    /// Asset symbol (defaults to the configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,
}

impl RoundArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let asset = self.asset.as_deref().unwrap_or(&config.market.asset);
        let resolver = RoundWindowResolver::new(config.market.round_duration_secs);
        let now = Utc::now();

        let current = resolver.current(asset, now);
        let next = current.following();

        println!("Current: {}", current.id());
        println!("  Start: {}", current.start);
        println!("  End:   {}", current.end());
        println!("  Left:  {}", format_time_left(current.time_remaining(now)));
        println!("Next:    {}", next.id());
        println!("  Start: {}", next.start);

        Ok(())
    }
}
