//! Quote module
//!
//! Resolves the relevant round and fetches its market-implied probabilities
//! and outcome tokens from the Gamma API, cached per round.

mod cache;
mod gamma;
mod source;
mod types;

pub use cache::Expiring;
pub use gamma::{GammaClient, GammaConfig, GAMMA_API_URL};
pub use source::{QuoteSource, DEFAULT_QUOTE_TTL_SECS};
pub use types::{Quote, QuoteError, RoundMarket, NEUTRAL_PROBABILITY};

use crate::round::RoundRef;
use async_trait::async_trait;

/// Source of round markets
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Market for a specific round, `Ok(None)` if the provider has none
    async fn fetch_round(&self, round: &RoundRef) -> Result<Option<RoundMarket>, QuoteError>;

    /// Open rounds for an asset and round length, ordered by start
    async fn fetch_open_rounds(
        &self,
        asset: &str,
        duration_secs: u64,
    ) -> Result<Vec<RoundMarket>, QuoteError>;
}
