//! Price stream: owner of the shared price window
//!
//! A pump task drains feed events into the window while the scheduler reads
//! snapshots. All access to the window goes through one `RwLock`.

use super::{FeedEvent, FeedState, PriceFeed, PriceTick};
use crate::clock::Clock;
use crate::momentum::{PricePoint, PriceWindow};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;

/// Streaming price ingestion and momentum for one asset
pub struct PriceStream {
    window: Arc<RwLock<PriceWindow>>,
    state_tx: Arc<watch::Sender<FeedState>>,
    clock: Arc<dyn Clock>,
    pumps: Mutex<Vec<JoinHandle<()>>>,
}

impl PriceStream {
    /// Create a stream with the default retention horizon
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_window(clock, PriceWindow::new())
    }

    /// Create a stream around a preconfigured window
    pub fn with_window(clock: Arc<dyn Clock>, window: PriceWindow) -> Self {
        let (state_tx, _) = watch::channel(FeedState::Idle);
        Self {
            window: Arc::new(RwLock::new(window)),
            state_tx: Arc::new(state_tx),
            clock,
            pumps: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to a feed and start ingesting its events
    pub async fn connect(&self, feed: &dyn PriceFeed) -> anyhow::Result<()> {
        let events = feed.subscribe().await?;
        self.attach(events);
        Ok(())
    }

    /// Start a pump task draining `events` into the window
    pub fn attach(&self, mut events: mpsc::Receiver<FeedEvent>) {
        let window = Arc::clone(&self.window);
        let state_tx = Arc::clone(&self.state_tx);
        let clock = Arc::clone(&self.clock);

        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    FeedEvent::Trade(tick) => {
                        Self::ingest_into(&window, clock.as_ref(), &tick).await;
                    }
                    FeedEvent::Connected => {
                        state_tx.send_replace(FeedState::Connected);
                    }
                    FeedEvent::Disconnected => {
                        tracing::debug!("Price feed dropped");
                    }
                    FeedEvent::Reconnecting { attempt } => {
                        state_tx.send_replace(FeedState::Reconnecting { attempt });
                    }
                    FeedEvent::GaveUp => {
                        tracing::error!("Price feed is down, momentum unavailable until restart");
                        state_tx.send_replace(FeedState::Down);
                        break;
                    }
                }
            }

            if state_tx.borrow().is_live() {
                state_tx.send_replace(FeedState::Closed);
            }
        });

        self.lock_pumps().push(handle);
    }

    /// Ingest a single tick stamped with the current clock time
    pub async fn ingest(&self, tick: &PriceTick) -> bool {
        Self::ingest_into(&self.window, self.clock.as_ref(), tick).await
    }

    async fn ingest_into(window: &RwLock<PriceWindow>, clock: &dyn Clock, tick: &PriceTick) -> bool {
        let now_ms = clock.now_ms();
        let kept = window
            .write()
            .await
            .ingest(PricePoint::new(now_ms, tick.price), now_ms);
        if !kept {
            tracing::trace!(price = %tick.price, "Dropped tick");
        }
        kept
    }

    /// Most recent price, stale if the feed is down
    pub async fn current_price(&self) -> Option<Decimal> {
        self.window.read().await.current_price()
    }

    /// Momentum over `window_seconds`, unavailable once the feed is down
    pub async fn momentum(&self, window_seconds: u64) -> Option<Decimal> {
        if !self.state().is_live() {
            return None;
        }
        self.window
            .read()
            .await
            .momentum(window_seconds, self.clock.now_ms())
    }

    /// Number of points currently retained
    pub async fn len(&self) -> usize {
        self.window.read().await.len()
    }

    /// Whether no price has been retained yet
    pub async fn is_empty(&self) -> bool {
        self.window.read().await.is_empty()
    }

    /// Current connection state
    pub fn state(&self) -> FeedState {
        *self.state_tx.borrow()
    }

    /// Watch connection state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<FeedState> {
        self.state_tx.subscribe()
    }

    /// Stop all pump tasks and mark the stream closed
    ///
    /// Dropping the pump's receiver also stops the upstream WebSocket task.
    pub fn disconnect(&self) {
        for handle in self.lock_pumps().drain(..) {
            handle.abort();
        }
        if self.state().is_live() {
            self.state_tx.send_replace(FeedState::Closed);
        }
        tracing::info!("Price stream disconnected");
    }

    fn lock_pumps(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pumps.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for PriceStream {
    fn drop(&mut self) {
        for handle in self.lock_pumps().drain(..) {
            handle.abort();
        }
    }
}
