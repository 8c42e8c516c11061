//! CLI interface for updown-edge
//!
//! Provides subcommands for:
//! - `run`: Start the decision loop
//! - `round`: Show the current and next round
//! - `quote`: One-shot quote for the current round
//! - `markets`: List open rounds from the quote provider
//! - `config`: Show effective configuration

mod markets;
mod quote;
mod round;
mod run;

pub use markets::MarketsArgs;
pub use quote::QuoteArgs;
pub use round::RoundArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "updown-edge")]
#[command(about = "Momentum edge detector for Polymarket crypto up/down rounds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the decision loop
    Run(RunArgs),
    /// Show the current and next round
    Round(RoundArgs),
    /// Fetch the quote for the current round
    Quote(QuoteArgs),
    /// List open rounds
    Markets(MarketsArgs),
    /// Show effective configuration
    Config,
}
