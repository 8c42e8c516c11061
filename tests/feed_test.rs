//! Integration tests for the price feed against a local WebSocket server

use futures_util::{SinkExt, StreamExt};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use updown_edge::clock::SystemClock;
use updown_edge::feed::{BinanceFeed, FeedState, PriceFeed, PriceStream};
use updown_edge::ws::ReconnectPolicy;

fn trade(price: &str) -> String {
    format!(
        r#"{{"e":"trade","E":1704067200000,"s":"BTCUSDT","t":1,"p":"{price}","q":"0.001","T":1704067200123}}"#
    )
}

/// Serve one connection: send `messages`, then hold it open until the
/// client goes away
async fn serve_once(messages: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for msg in messages {
            ws.send(Message::Text(msg)).await.unwrap();
        }
        while let Some(Ok(_)) = ws.next().await {}
    });

    format!("ws://{}/ws", addr)
}

#[tokio::test]
async fn test_binance_feed_subscribe() {
    let feed = BinanceFeed::new("btcusdt");
    let result = feed.subscribe().await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_stream_ingests_trades_from_socket() {
    let url = serve_once(vec![
        trade("42000.00"),
        "not json".to_string(),
        trade("not_a_number"),
        trade("42100.50"),
    ])
    .await;

    let feed = BinanceFeed::new("btcusdt").with_base_url(url);
    let prices = PriceStream::new(Arc::new(SystemClock));
    prices.connect(&feed).await.unwrap();

    let mut state = prices.subscribe_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == FeedState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while prices.len().await < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(prices.len().await, 2);
    assert_eq!(prices.current_price().await, Some(dec!(42100.50)));

    prices.disconnect();
    assert_eq!(prices.state(), FeedState::Closed);
}

#[tokio::test]
async fn test_stream_degrades_after_reconnects_exhausted() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let feed = BinanceFeed::new("btcusdt")
        .with_base_url(format!("ws://{}/ws", addr))
        .with_reconnect(ReconnectPolicy {
            delay: Duration::from_millis(10),
            max_attempts: 3,
        });
    let prices = PriceStream::new(Arc::new(SystemClock));
    prices.connect(&feed).await.unwrap();

    let mut state = prices.subscribe_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == FeedState::Down),
    )
    .await
    .unwrap()
    .unwrap();

    assert!(!prices.state().is_live());
    assert_eq!(prices.current_price().await, None);
    assert_eq!(prices.momentum(30).await, None);
}
