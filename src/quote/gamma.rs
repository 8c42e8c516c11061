//! Gamma API client for round quotes
//!
//! Looks up up/down round markets on Polymarket's Gamma API either by their
//! deterministic slug (`btc-updown-15m-<start>`) or by listing open markets.

use super::{QuoteError, QuoteProvider, RoundMarket, NEUTRAL_PROBABILITY};
use crate::round::{duration_label, parse_slug_start, RoundRef};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Configuration for the Gamma client
#[derive(Debug, Clone)]
pub struct GammaConfig {
    /// Base URL for the Gamma API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Page size for open-market listings
    pub list_limit: u32,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            base_url: GAMMA_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            list_limit: 500,
        }
    }
}

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    config: GammaConfig,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client with default configuration
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_config(GammaConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: GammaConfig) -> Result<Self, QuoteError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch a market by slug; `Ok(None)` when the provider has no such market
    pub async fn fetch_market_by_slug(
        &self,
        slug: &str,
        fallback_end: DateTime<Utc>,
    ) -> Result<Option<RoundMarket>, QuoteError> {
        let url = format!("{}/markets/slug/{}", self.config.base_url, slug);

        tracing::debug!(url = %url, "Fetching round market from Gamma API");

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        let market: GammaMarket = response.json().await?;
        Ok(Some(convert_to_market(market, fallback_end)))
    }

    /// List open rounds for an asset using the active/open filter
    ///
    /// Returns markets whose slug matches `<asset>-updown-<label>-<start>`,
    /// ordered by start time.
    pub async fn fetch_open_rounds(
        &self,
        asset: &str,
        duration_secs: u64,
    ) -> Result<Vec<RoundMarket>, QuoteError> {
        let url = format!("{}/markets", self.config.base_url);
        let prefix = format!(
            "{}-updown-{}-",
            asset.to_lowercase(),
            duration_label(duration_secs)
        );

        tracing::debug!(url = %url, prefix = %prefix, "Listing open rounds from Gamma API");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("active", "true".to_string()),
                ("closed", "false".to_string()),
                ("limit", self.config.list_limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        let gamma_markets: Vec<GammaMarket> = response.json().await?;

        let mut rounds: Vec<(i64, RoundMarket)> = gamma_markets
            .into_iter()
            .filter(|m| m.slug.starts_with(&prefix))
            .filter_map(|m| {
                let start = parse_slug_start(&m.slug)?;
                let fallback_end = Utc.timestamp_opt(start, 0).single()?
                    + ChronoDuration::seconds(duration_secs as i64);
                Some((start, convert_to_market(m, fallback_end)))
            })
            .collect();
        rounds.sort_by_key(|(start, _)| *start);

        tracing::info!(open_rounds = rounds.len(), asset, "Found open rounds");

        Ok(rounds.into_iter().map(|(_, m)| m).collect())
    }
}

#[async_trait]
impl QuoteProvider for GammaClient {
    async fn fetch_round(&self, round: &RoundRef) -> Result<Option<RoundMarket>, QuoteError> {
        self.fetch_market_by_slug(&round.id(), round.end()).await
    }

    async fn fetch_open_rounds(
        &self,
        asset: &str,
        duration_secs: u64,
    ) -> Result<Vec<RoundMarket>, QuoteError> {
        GammaClient::fetch_open_rounds(self, asset, duration_secs).await
    }
}

/// Raw market response from Gamma API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    /// Market slug
    #[serde(default)]
    slug: String,
    /// Market question
    #[serde(default)]
    question: String,
    /// Condition ID for the market
    #[serde(default)]
    condition_id: String,
    /// CLOB token IDs, a JSON-encoded string or an array
    #[serde(default)]
    clob_token_ids: Option<Value>,
    /// Outcome prices, a JSON-encoded string or an array
    #[serde(default)]
    outcome_prices: Option<Value>,
    /// Market end date
    #[serde(default)]
    end_date: Option<String>,
    /// Whether market is active
    #[serde(default)]
    active: bool,
    /// Whether market is closed
    #[serde(default)]
    closed: bool,
}

/// Convert a GammaMarket to a RoundMarket
///
/// Missing tokens default to empty and missing prices to the neutral prior,
/// per outcome, so one unresolvable side does not void the other.
fn convert_to_market(gamma: GammaMarket, fallback_end: DateTime<Utc>) -> RoundMarket {
    let tokens = gamma
        .clob_token_ids
        .as_ref()
        .map(string_list)
        .unwrap_or_default();
    let prices = gamma
        .outcome_prices
        .as_ref()
        .map(string_list)
        .unwrap_or_default();

    let token_at = |i: usize| tokens.get(i).cloned().unwrap_or_default();
    let price_at = |i: usize| {
        prices
            .get(i)
            .and_then(|p| Decimal::from_str(p).ok())
            .filter(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE)
            .unwrap_or(NEUTRAL_PROBABILITY)
    };

    let end_time = gamma
        .end_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback_end);

    RoundMarket {
        up_token: token_at(0),
        down_token: token_at(1),
        up_price: price_at(0),
        down_price: price_at(1),
        end_time,
        active: gamma.active && !gamma.closed,
        slug: gamma.slug,
        question: gamma.question,
        condition_id: gamma.condition_id,
    }
}

/// Read a list of strings given either as a JSON array or as a string
/// containing a JSON array, e.g. `"[\"0.52\", \"0.48\"]"`
fn string_list(value: &Value) -> Vec<String> {
    let array = match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        Value::Array(items) => items.clone(),
        _ => return Vec::new(),
    };

    array
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}
