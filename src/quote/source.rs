//! Cached, fail-open quote lookup for the current round

use super::{Expiring, Quote, QuoteProvider, RoundMarket};
use crate::clock::Clock;
use crate::round::{RoundRef, RoundWindowResolver};
use crate::telemetry::{increment, CounterMetric};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default lifetime of a cached quote, in seconds
pub const DEFAULT_QUOTE_TTL_SECS: i64 = 60;

/// Supplies the quote for the round currently worth trading
///
/// Tries the current round first and falls back to the next one when the
/// current market is closed, expired or missing. Provider failures never
/// surface to callers; they produce a not-found quote with a neutral prior.
pub struct QuoteSource {
    provider: Arc<dyn QuoteProvider>,
    resolver: RoundWindowResolver,
    asset: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<Expiring<Quote>>>,
}

impl QuoteSource {
    /// Create a quote source for `asset`
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        resolver: RoundWindowResolver,
        asset: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            resolver,
            asset: asset.into().to_lowercase(),
            ttl: Duration::seconds(DEFAULT_QUOTE_TTL_SECS),
            clock,
            cache: RwLock::new(None),
        }
    }

    /// Override the cache lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Asset this source quotes
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Resolver used to pick rounds
    pub fn resolver(&self) -> RoundWindowResolver {
        self.resolver
    }

    /// Current quote, served from cache while fresh
    ///
    /// A cached found quote whose round has already ended is refetched even
    /// inside the TTL.
    pub async fn get_quote(&self) -> Quote {
        let now = self.clock.now();

        if let Some(quote) = self.cached(now).await {
            tracing::trace!(round = %quote.round_id, "Quote cache hit");
            return quote;
        }

        let quote = self.resolve(now).await;
        *self.cache.write().await = Some(Expiring::new(quote.clone(), now + self.ttl));
        quote
    }

    /// Drop the cached quote
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn cached(&self, now: DateTime<Utc>) -> Option<Quote> {
        let cache = self.cache.read().await;
        let quote = cache.as_ref()?.get(now)?;
        (!quote.found || quote.expires_at > now).then(|| quote.clone())
    }

    async fn resolve(&self, now: DateTime<Utc>) -> Quote {
        let current = self.resolver.current(&self.asset, now);

        if let Some(market) = self.lookup(&current).await {
            if market.active && market.end_time > now {
                return self.found(market, now);
            }
            tracing::debug!(round = %current, "Current round not open, trying next");
        }

        let next = current.following();
        if let Some(market) = self.lookup(&next).await {
            return self.found(market, now);
        }

        tracing::info!(round = %current, "No market for current or next round");
        increment(CounterMetric::QuoteNotFound);
        Quote::not_found(current.id(), current.end(), now)
    }

    async fn lookup(&self, round: &RoundRef) -> Option<RoundMarket> {
        match self.provider.fetch_round(round).await {
            Ok(market) => market,
            Err(e) => {
                tracing::warn!(round = %round, error = %e, "Quote lookup failed");
                increment(CounterMetric::QuoteErrors);
                None
            }
        }
    }

    fn found(&self, market: RoundMarket, now: DateTime<Utc>) -> Quote {
        let quote = Quote::from_market(market, now);
        tracing::debug!(
            round = %quote.round_id,
            up = %quote.up_probability,
            down = %quote.down_probability,
            "Fetched quote"
        );
        quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::quote::QuoteError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider backed by a slug map; unknown slugs are not found
    #[derive(Default)]
    struct MockProvider {
        markets: Mutex<HashMap<String, RoundMarket>>,
        fail: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn insert(&self, market: RoundMarket) {
            self.markets
                .lock()
                .unwrap()
                .insert(market.slug.clone(), market);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        async fn fetch_round(&self, round: &RoundRef) -> Result<Option<RoundMarket>, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(QuoteError::Decode("boom".to_string()));
            }
            Ok(self.markets.lock().unwrap().get(&round.id()).cloned())
        }

        async fn fetch_open_rounds(
            &self,
            _asset: &str,
            _duration_secs: u64,
        ) -> Result<Vec<RoundMarket>, QuoteError> {
            Ok(self.markets.lock().unwrap().values().cloned().collect())
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn market(round: &RoundRef, active: bool) -> RoundMarket {
        RoundMarket {
            slug: round.id(),
            question: "Bitcoin Up or Down".to_string(),
            condition_id: "0xabc".to_string(),
            up_token: format!("{}-up", round.start_ts()),
            down_token: format!("{}-down", round.start_ts()),
            up_price: dec!(0.60),
            down_price: dec!(0.42),
            end_time: round.end(),
            active,
        }
    }

    fn setup() -> (Arc<MockProvider>, Arc<ManualClock>, QuoteSource) {
        let provider = Arc::new(MockProvider::default());
        let clock = Arc::new(ManualClock::new(start() + Duration::seconds(100)));
        let source = QuoteSource::new(
            provider.clone(),
            RoundWindowResolver::new(900),
            "BTC",
            clock.clone(),
        );
        (provider, clock, source)
    }

    #[tokio::test]
    async fn test_current_round_quote() {
        let (provider, clock, source) = setup();
        let round = RoundWindowResolver::new(900).current("btc", clock.now());
        provider.insert(market(&round, true));

        let quote = source.get_quote().await;
        assert!(quote.found);
        assert_eq!(quote.round_id, "btc-updown-15m-1705314600");
        assert_eq!(quote.up_probability, dec!(0.60));
        assert_eq!(quote.expires_at, round.end());
    }

    #[tokio::test]
    async fn test_falls_back_to_next_round_when_current_closed() {
        let (provider, clock, source) = setup();
        let current = RoundWindowResolver::new(900).current("btc", clock.now());
        provider.insert(market(&current, false));
        provider.insert(market(&current.following(), true));

        let quote = source.get_quote().await;
        assert!(quote.found);
        assert_eq!(quote.round_id, current.following().id());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_market_is_not_found() {
        let (provider, _clock, source) = setup();

        let quote = source.get_quote().await;
        assert!(!quote.found);
        assert_eq!(quote.up_probability, dec!(0.5));
        assert_eq!(quote.down_probability, dec!(0.5));
        assert!(quote.up_token.is_empty());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_fails_open() {
        let (provider, _clock, source) = setup();
        *provider.fail.lock().unwrap() = true;

        let quote = source.get_quote().await;
        assert!(!quote.found);
        assert_eq!(quote.up_probability, dec!(0.5));
    }

    #[tokio::test]
    async fn test_quote_cached_within_ttl() {
        let (provider, clock, source) = setup();
        let round = RoundWindowResolver::new(900).current("btc", clock.now());
        provider.insert(market(&round, true));

        let first = source.get_quote().await;
        clock.advance(Duration::seconds(59));
        let second = source.get_quote().await;

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_quote_refetched_after_ttl() {
        let (provider, clock, source) = setup();
        let round = RoundWindowResolver::new(900).current("btc", clock.now());
        provider.insert(market(&round, true));

        source.get_quote().await;
        clock.advance(Duration::seconds(60));
        source.get_quote().await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_cached_too() {
        let (provider, clock, source) = setup();

        source.get_quote().await;
        clock.advance(Duration::seconds(30));
        let quote = source.get_quote().await;

        assert!(!quote.found);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_round_refetched_inside_ttl() {
        let (provider, clock, source) = setup();
        let current = RoundWindowResolver::new(900).current("btc", clock.now());
        provider.insert(market(&current, true));
        provider.insert(market(&current.following(), true));

        // 10:44:40, cached quote for the 10:30 round
        clock.set(current.end() - Duration::seconds(20));
        let first = source.get_quote().await;
        assert_eq!(first.round_id, current.id());

        // 10:45:10, round ended; cache entry still inside its TTL
        clock.advance(Duration::seconds(30));
        let second = source.get_quote().await;
        assert_eq!(second.round_id, current.following().id());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (provider, _clock, source) = setup();

        source.get_quote().await;
        source.invalidate().await;
        source.get_quote().await;

        assert_eq!(provider.calls(), 4);
    }
}
